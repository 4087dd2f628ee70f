//! Panel UART transmit task
//!
//! Sends status reports and heartbeat responses to the operator panel.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embassy_time::{Duration, Ticker};
use embedded_io_async::Write;

use hearth_protocol::{ControllerMessage, MAX_FRAME_SIZE};

use crate::channels::{HEARTBEAT_RECEIVED, STATUS};

/// Panel TX task - sends frames to the panel
#[embassy_executor::task]
pub async fn panel_tx_task(mut tx: BufferedUartTx) {
    info!("Panel TX task started");

    let mut ticker = Ticker::every(Duration::from_millis(50));

    loop {
        if HEARTBEAT_RECEIVED.signaled() {
            HEARTBEAT_RECEIVED.reset();
            send(&mut tx, &ControllerMessage::Pong).await;
        }

        if let Some(report) = STATUS.try_take() {
            send(&mut tx, &ControllerMessage::Status(report)).await;
        }

        ticker.next().await;
    }
}

async fn send(tx: &mut BufferedUartTx, msg: &ControllerMessage) {
    let frame = match msg.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Failed to encode {:?}: {:?}", msg, e);
            return;
        }
    };

    let mut buf = [0u8; MAX_FRAME_SIZE];
    match frame.encode(&mut buf) {
        Ok(len) => {
            if let Err(e) = tx.write_all(&buf[..len]).await {
                warn!("UART write error: {:?}", e);
            }
        }
        Err(e) => warn!("Frame encode error: {:?}", e),
    }
}
