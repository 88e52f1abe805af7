//! Inter-task communication
//!
//! The bridge is shared by every task behind a critical-section mutex; each
//! task runs one entry point per wakeup and releases it again. Signals carry
//! the wakeups between tasks.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use dmx_mpx_core::{Bridge, BridgeConfig};

use crate::bus::StagedBus;

/// Bridge type used by the firmware
pub type FirmwareBridge = Bridge<StagedBus>;

/// The bridge, installed once by `main`
pub static BRIDGE: Mutex<CriticalSectionRawMutex, RefCell<Option<FirmwareBridge>>> =
    Mutex::new(RefCell::new(None));

/// A frame attempt finished; the mainline should re-arm acquisition
pub static FRAME_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Acquisition re-armed; the break task resumes sampling
pub static BREAK_REARM: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// A DAC transaction was started and has staged bus work
pub static DAC_KICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Lamp state changed outside the status period
pub static LAMPS_CHANGED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// New channel window from the front panel, applied at the next frame boundary
///
/// Input seam for the front-panel user interface, which lives outside this
/// firmware; nothing here signals it. Until a panel is attached the
/// mainline only ever wakes on [`FRAME_READY`].
pub static CONFIG_UPDATE: Signal<CriticalSectionRawMutex, BridgeConfig> = Signal::new();

/// Run `f` on the installed bridge
///
/// Returns `None` until `main` has installed it.
pub fn with_bridge<R>(f: impl FnOnce(&mut FirmwareBridge) -> R) -> Option<R> {
    BRIDGE.lock(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Install the bridge
pub fn install(bridge: FirmwareBridge) {
    BRIDGE.lock(|cell| {
        cell.replace(Some(bridge));
    });
}
