//! MPX output task
//!
//! Plays the role of the pulse timer: every expiry emits the next scan step
//! and reloads with that step's hold time. Deadlines are absolute so the scan
//! period does not drift with task latency.

use defmt::*;
use embassy_time::{Duration, Instant, Timer};

use dmx_mpx_core::dac::RequestOutcome;

use crate::channels::{with_bridge, DAC_KICK};

/// MPX task - emits the analog multiplex scan
#[embassy_executor::task]
pub async fn mpx_task() {
    info!("MPX task started");

    let mut deadline = Instant::now();

    loop {
        let Some(tick) = with_bridge(|b| b.on_mpx_timer()) else {
            Timer::after_millis(1).await;
            deadline = Instant::now();
            continue;
        };

        match tick.dac {
            Ok(RequestOutcome::Started) => DAC_KICK.signal(()),
            Ok(RequestOutcome::Dropped) => {
                trace!("DAC busy, dropped {:?}", tick.step.phase);
            }
            Err(e) => warn!("DAC start failed: {:?}", e),
        }

        let hold = Duration::from_micros(tick.step.hold_us as u64);
        deadline += hold;
        let now = Instant::now();
        if deadline <= now {
            // Fell behind; restart the timebase instead of bursting steps
            deadline = now + hold;
        }
        Timer::at(deadline).await;
    }
}
