//! dmx-mpx - DMX512 to analog MPX bridge firmware
//!
//! Main firmware binary for RP2040-based bridge boards. Receives a DMX512
//! universe on UART0, captures the configured channel window and replays it
//! as an analog multiplex pulse train through an MCP4716-class DAC on I2C0.
//!
//! Pin assignments:
//! - GPIO1: DMX receive (UART0 RX, via RS-485 transceiver)
//! - GPIO4 / GPIO5: DAC SDA / SCL (I2C0)
//! - GPIO14: activity lamp
//! - GPIO15: heartbeat lamp

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::peripherals::{I2C0, UART0};
use embassy_rp::uart::{
    BufferedInterruptHandler, BufferedUartRx, Config as UartConfig, DataBits, Parity, StopBits,
};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dmx_mpx_core::config::DMX_BAUDRATE;
use dmx_mpx_core::dac::RequestOutcome;
use dmx_mpx_core::{Bridge, BridgeConfig};

mod bus;
mod channels;
mod config;
mod tasks;

use crate::bus::StagedBus;
use crate::channels::{with_bridge, BREAK_REARM, CONFIG_UPDATE, DAC_KICK, FRAME_READY};

/// GPIO number of the DMX receive pin
const DMX_RX_PIN: u8 = 1;

/// DAC bus clock (fast mode)
const DAC_I2C_HZ: u32 = 400_000;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
});

// UART receive buffer (must live forever)
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
///
/// After setup this task becomes the mainline: it re-arms acquisition after
/// every finished frame and applies front-panel configuration changes.
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("dmx-mpx bridge starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();
    info!(
        "Window: start_address={}, channel_count={}, break >= {}us",
        config.start_address,
        config.channel_count,
        config.break_timing.min_break_us()
    );

    let bridge = match Bridge::new(config, StagedBus::new()) {
        Ok(bridge) => bridge,
        Err(e) => {
            error!("Rejected configuration: {:?}, using defaults", e);
            match Bridge::new(BridgeConfig::default(), StagedBus::new()) {
                Ok(bridge) => bridge,
                Err(e) => defmt::panic!("Default configuration rejected: {:?}", e),
            }
        }
    };
    channels::install(bridge);

    // DAC on I2C0
    let i2c_config = {
        let mut cfg = i2c::Config::default();
        cfg.frequency = DAC_I2C_HZ;
        cfg
    };
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config);
    info!("I2C initialized for DAC");

    // DMX512 line: 250 kbaud, 8 data bits, no parity, 2 stop bits
    let uart_config = {
        let mut cfg = UartConfig::default();
        cfg.baudrate = DMX_BAUDRATE;
        cfg.data_bits = DataBits::DataBits8;
        cfg.parity = Parity::ParityNone;
        cfg.stop_bits = StopBits::STOP2;
        cfg
    };
    let rx_buf = RX_BUF.init([0u8; 256]);
    let rx = BufferedUartRx::new(p.UART0, Irqs, p.PIN_1, rx_buf, uart_config);
    info!("UART initialized for DMX reception");

    let activity = Output::new(p.PIN_14, Level::Low);
    let heartbeat = Output::new(p.PIN_15, Level::Low);

    spawner.spawn(tasks::dac_task(i2c)).unwrap();

    // Hold the output at sync level until the scan starts
    match with_bridge(|b| b.park_output()) {
        Some(Ok(RequestOutcome::Started)) => DAC_KICK.signal(()),
        Some(Ok(RequestOutcome::Dropped)) | None => {}
        Some(Err(e)) => warn!("Failed to park DAC output: {:?}", e),
    }

    spawner.spawn(tasks::mpx_task()).unwrap();
    spawner.spawn(tasks::dmx_rx_task(rx)).unwrap();
    spawner
        .spawn(tasks::break_task(tasks::RxLineProbe::new(DMX_RX_PIN)))
        .unwrap();
    spawner.spawn(tasks::status_task(heartbeat, activity)).unwrap();

    info!("All tasks spawned, bridge running");

    loop {
        match select(FRAME_READY.wait(), CONFIG_UPDATE.wait()).await {
            Either::First(()) => {
                let serviced = with_bridge(|b| (b.poll_mainline(), b.stats()));
                if let Some((Some(outcome), stats)) = serviced {
                    trace!(
                        "{:?} (completed={}, aborted={}, ignored={})",
                        outcome,
                        stats.completed,
                        stats.aborted,
                        stats.ignored
                    );
                    BREAK_REARM.signal(());
                }
            }
            Either::Second(update) => match with_bridge(|b| b.stage_config(update)) {
                Some(Ok(())) => info!("Configuration staged for next frame"),
                Some(Err(e)) => warn!("Rejected configuration update: {:?}", e),
                None => {}
            },
        }
    }
}
