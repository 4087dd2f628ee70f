//! Panel UART receive task
//!
//! Receives frames from the operator panel and dispatches them.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use hearth_protocol::{DisplayMessage, FrameParser};

use crate::channels::{HEARTBEAT_RECEIVED, PANEL_INPUT};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Panel RX task - receives and parses frames from the panel
#[embassy_executor::task]
pub async fn panel_rx_task(mut rx: BufferedUartRx) {
    info!("Panel RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match DisplayMessage::from_frame(&frame) {
                            Ok(msg) => handle_message(msg),
                            Err(e) => warn!("Failed to parse panel message: {:?}", e),
                        },
                        Ok(None) => {}
                        Err(e) => warn!("Frame parse error: {:?}", e),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

fn handle_message(msg: DisplayMessage) {
    match msg {
        DisplayMessage::Ping => {
            trace!("PING received");
            HEARTBEAT_RECEIVED.signal(());
        }
        DisplayMessage::Input(input) => {
            debug!("Panel input: {:?}", input);
            if PANEL_INPUT.try_send(input).is_err() {
                warn!("Input channel full, dropping {:?}", input);
            }
        }
    }
}
