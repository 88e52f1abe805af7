//! DMX receive task
//!
//! Feeds every received byte and line error to the frame receiver and tells
//! the mainline when a frame attempt has finished.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, Error as UartError};
use embedded_io_async::Read;

use dmx_mpx_core::dmx::{LineError, RxEvent};

use crate::channels::{with_bridge, FRAME_READY, LAMPS_CHANGED};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

/// What a UART error means to the frame receiver
enum LineEvent {
    /// Every DMX frame opens with one; the receiver decides whether it is
    /// the frame's own break or a short frame
    Break,
    Error(LineError),
}

fn line_event(e: UartError) -> LineEvent {
    match e {
        UartError::Break => LineEvent::Break,
        UartError::Overrun => LineEvent::Error(LineError::Overrun),
        UartError::Parity => LineEvent::Error(LineError::Parity),
        UartError::Framing => LineEvent::Error(LineError::Framing),
        #[allow(unreachable_patterns)]
        _ => LineEvent::Error(LineError::Framing),
    }
}

/// DMX RX task - drives the frame receiver from the UART
#[embassy_executor::task]
pub async fn dmx_rx_task(mut rx: BufferedUartRx) {
    info!("DMX RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];
    let mut activity = false;

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    let update = with_bridge(|b| (b.on_rx_byte(byte), b.lamps().activity));
                    if let Some((event, lamp)) = update {
                        handle_event(event);
                        if lamp != activity {
                            activity = lamp;
                            LAMPS_CHANGED.signal(());
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                let line = line_event(e);
                let update = with_bridge(|b| {
                    let event = match line {
                        LineEvent::Break => b.on_rx_break(),
                        LineEvent::Error(error) => b.on_rx_error(error),
                    };
                    (event, b.lamps().activity)
                });
                if let Some((event, lamp)) = update {
                    handle_event(event);
                    if lamp != activity {
                        activity = lamp;
                        LAMPS_CHANGED.signal(());
                    }
                }
            }
        }
    }
}

fn handle_event(event: RxEvent) {
    match event {
        RxEvent::Finished(outcome) => {
            trace!("Frame attempt finished: {:?}", outcome);
            FRAME_READY.signal(());
        }
        RxEvent::ErrorNoted(error) => {
            debug!("Line error ignored by policy: {:?}", error);
        }
        RxEvent::Cleared(error) => {
            trace!("Pending {:?} from break cleared", error);
        }
        RxEvent::Disabled | RxEvent::Skipped | RxEvent::Stored => {}
    }
}
