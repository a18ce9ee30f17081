//! ESP-NOW receive task
//!
//! Feeds every received frame to the link and reports the outcome.

use defmt::*;

use co2_gadget_core::link::ReceiveOutcome;
use co2_gadget_hal::RadioRx;
use co2_gadget_hal_esp32::EspNowRx;
use co2_gadget_protocol::{MacAddress, RecordError, TelemetryRecord};

use crate::channels::{CALIBRATION_REQUEST, LINK};

/// Largest ESP-NOW payload
const RX_BUF_SIZE: usize = 250;

/// ESP-NOW RX task - decodes gateway records addressed to this board
#[embassy_executor::task]
pub async fn espnow_rx_task(mut rx: EspNowRx<'static>) {
    info!("ESP-NOW RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let frame = match rx.receive(&mut buf).await {
            Ok(frame) => frame,
            Err(e) => {
                warn!("-->[ESPN] Receive error: {=str}", e.description());
                continue;
            }
        };

        let source = MacAddress::new(frame.source);
        let data = &buf[..frame.len.min(RX_BUF_SIZE)];
        trace!("-->[ESPN] {} bytes from {}", frame.len, source);

        let outcome = LINK.lock().await.handle_received(source, data);
        handle_outcome(outcome);
    }
}

/// Report what the link made of a frame
fn handle_outcome(outcome: ReceiveOutcome) {
    match outcome {
        ReceiveOutcome::Accepted(record) => {
            info!("-->[ESPN] Received data for this board via ESP-NOW");
            log_record(&record);
        }
        ReceiveOutcome::CalibrationRequested { value } => {
            info!("-->[ESPN] *****************************************************************************");
            info!("-->[ESPN] ***** Calibration requested   Parameter:\t{}", value);
            info!("-->[ESPN] *****************************************************************************");
            CALIBRATION_REQUEST.signal(value);
        }
        ReceiveOutcome::OtherBoard { board_id } => {
            debug!("-->[ESPN] Ignoring data addressed to board {}", board_id);
        }
        ReceiveOutcome::Discarded(RecordError::LengthMismatch { received, expected }) => {
            warn!(
                "-->[ESPN] ERROR: Incorrect size of received data. Received bytes: {} ({} expected)",
                received, expected
            );
        }
        ReceiveOutcome::Discarded(e) => {
            warn!("-->[ESPN] Discarded frame: {:?}", e);
        }
    }
}

fn log_record(record: &TelemetryRecord) {
    info!("-->[ESPN] Measurements received");
    info!("-->[ESPN] CO2 Level:\t{}", record.co2);
    info!("-->[ESPN] Temperature:\t{}", record.temperature);
    info!("-->[ESPN] Humidity:\t{}", record.humidity);
    info!("-->[ESPN] Battery:\t{}", record.battery);
    info!("-->[ESPN] Command:\t{}", record.command);
    info!("-->[ESPN] Parameter:\t{}", record.parameter);
}
