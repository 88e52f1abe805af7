//! Shared host-side test rig

#![allow(dead_code)]

use dmx_mpx_core::dac::DacPhase;
use dmx_mpx_core::dmx::{BreakEvent, FrameOutcome};
use dmx_mpx_core::traits::TwoWireBus;
use dmx_mpx_core::{Bridge, BridgeConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wire {
    Start,
    Byte(u8),
    Stop,
}

/// Bus that records every action
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub wire: Vec<Wire>,
}

impl RecordingBus {
    /// Data bytes of each complete transaction (address byte dropped)
    pub fn samples(&self) -> Vec<u16> {
        self.wire
            .split(|w| *w == Wire::Stop)
            .filter_map(|t| match t {
                [Wire::Start, Wire::Byte(_), Wire::Byte(hi), Wire::Byte(lo)] => {
                    Some(((*hi as u16) << 6) | ((*lo as u16) >> 2))
                }
                _ => None,
            })
            .collect()
    }
}

impl TwoWireBus for RecordingBus {
    type Error = ();

    fn start(&mut self) -> Result<(), ()> {
        self.wire.push(Wire::Start);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), ()> {
        self.wire.push(Wire::Byte(byte));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ()> {
        self.wire.push(Wire::Stop);
        Ok(())
    }
}

pub fn bridge(start_address: u16, channel_count: u16) -> Bridge<RecordingBus> {
    let config = BridgeConfig::with_window(start_address, channel_count).unwrap();
    Bridge::new(config, RecordingBus::default()).unwrap()
}

/// Hold the line low for `ticks` samples, then mark
pub fn send_break(bridge: &mut Bridge<RecordingBus>, ticks: u16) -> BreakEvent {
    for _ in 0..ticks {
        bridge.on_break_tick(true);
    }
    bridge.on_break_tick(false)
}

/// Break, start code and slots (mainline loop not run)
pub fn send_frame(bridge: &mut Bridge<RecordingBus>, start_code: u8, slots: &[u8]) {
    assert_eq!(send_break(bridge, 20), BreakEvent::HandOff);
    bridge.on_rx_byte(start_code);
    for &b in slots {
        bridge.on_rx_byte(b);
    }
}

/// Send a frame and run the mainline loop once
pub fn deliver(bridge: &mut Bridge<RecordingBus>, slots: &[u8]) -> Option<FrameOutcome> {
    send_frame(bridge, 0, slots);
    bridge.poll_mainline()
}

/// Complete the in-flight DAC transaction
pub fn finish_dac(bridge: &mut Bridge<RecordingBus>) {
    while bridge.on_dac_complete().unwrap() != DacPhase::Idle {}
}
