//! Break detection task
//!
//! Samples the DMX receive line on a fixed tick and feeds the break detector.
//! Sampling stops once the detector hands off to the receiver and resumes
//! when the mainline re-arms acquisition.

use defmt::*;
use embassy_rp::pac;
use embassy_time::{Duration, Ticker};

use dmx_mpx_core::dmx::BreakEvent;

use crate::channels::{with_bridge, BREAK_REARM};

/// Reads the UART RX pin level while the pin belongs to the UART
pub struct RxLineProbe {
    pin: u8,
}

impl RxLineProbe {
    pub const fn new(pin: u8) -> Self {
        Self { pin }
    }

    /// A break holds the line low (space)
    pub fn is_break_level(&self) -> bool {
        pac::SIO.gpio_in(0).read() & (1 << self.pin) == 0
    }
}

fn tick_period() -> Duration {
    let tick_us = with_bridge(|b| b.config().break_timing.tick_us).unwrap_or(4);
    Duration::from_micros(tick_us as u64)
}

/// Break task - samples the line until a break is handed off
#[embassy_executor::task]
pub async fn break_task(line: RxLineProbe) {
    info!("Break task started");

    let mut ticker = Ticker::every(tick_period());

    loop {
        ticker.next().await;

        match with_bridge(|b| b.on_break_tick(line.is_break_level())) {
            Some(BreakEvent::Confirmed) => {
                trace!("Break confirmed, waiting for mark");
            }
            Some(BreakEvent::HandOff) => {
                trace!("Break ended, receiver enabled");
                BREAK_REARM.wait().await;
                // Tick period may have changed with a staged config
                ticker = Ticker::every(tick_period());
            }
            Some(BreakEvent::None) | None => {}
        }
    }
}
