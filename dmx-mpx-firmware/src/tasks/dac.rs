//! DAC bus task
//!
//! Advances the DAC transaction through its bus conditions. Staged conditions
//! complete immediately; the stop condition flushes the whole write to the
//! I2C peripheral and the transaction completes when that write does.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embedded_hal_async::i2c::I2c as _;

use dmx_mpx_core::dac::DacPhase;

use crate::channels::{with_bridge, DAC_KICK};

/// DAC task - drives one transaction per kick
#[embassy_executor::task]
pub async fn dac_task(mut i2c: I2c<'static, I2C0, Async>) {
    info!("DAC task started");

    loop {
        DAC_KICK.wait().await;

        loop {
            let step = with_bridge(|b| {
                let phase = b.on_dac_complete();
                (phase, b.dac_mut().bus_mut().take_write())
            });

            match step {
                None | Some((Ok(DacPhase::Idle), _)) => break,
                Some((Err(e), _)) => {
                    warn!("DAC transaction aborted: {:?}", e);
                    break;
                }
                Some((Ok(_), Some(write))) => {
                    if let Err(e) = i2c.write(write.address, &write.payload).await {
                        warn!("DAC write failed: {:?}", e);
                    }
                }
                Some((Ok(_), None)) => {}
            }
        }
    }
}
