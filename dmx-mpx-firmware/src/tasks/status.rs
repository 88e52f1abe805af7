//! Status lamp task
//!
//! Toggles the heartbeat lamp every status period and runs link
//! supervision. Activity changes signalled by the receive side are shown
//! immediately.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Ticker};

use dmx_mpx_core::config::STATUS_PERIOD_MS;
use dmx_mpx_core::status::Lamps;

use crate::channels::{with_bridge, LAMPS_CHANGED};

/// Status task - owns the heartbeat and activity lamps
#[embassy_executor::task]
pub async fn status_task(mut heartbeat: Output<'static>, mut activity: Output<'static>) {
    info!("Status task started");

    let mut ticker = Ticker::every(Duration::from_millis(STATUS_PERIOD_MS as u64));
    let mut shown = Lamps::default();

    loop {
        let lamps = match select(ticker.next(), LAMPS_CHANGED.wait()).await {
            Either::First(()) => with_bridge(|b| b.on_status_period()),
            Either::Second(()) => with_bridge(|b| b.lamps()),
        };
        let Some(lamps) = lamps else {
            continue;
        };

        if lamps.activity != shown.activity {
            if lamps.activity {
                info!("DMX link active");
            } else {
                warn!("DMX link lost");
            }
        }

        heartbeat.set_level(lamps.heartbeat.into());
        activity.set_level(lamps.activity.into());
        shown = lamps;
    }
}
