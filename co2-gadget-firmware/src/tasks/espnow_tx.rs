//! ESP-NOW publish task
//!
//! Checks once a second whether a publication is due and sends it.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use co2_gadget_hal::{RadioTx, SendStatus};
use co2_gadget_hal_esp32::EspNowTx;

use crate::channels::{LINK, READINGS};

/// How often the publish timer is checked
const CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// ESP-NOW TX task - publishes the latest readings to the gateway
#[embassy_executor::task]
pub async fn espnow_tx_task(mut tx: EspNowTx<'static>) {
    info!("ESP-NOW TX task started");

    let mut ticker = Ticker::every(CHECK_INTERVAL);

    loop {
        ticker.next().await;

        let readings = *READINGS.lock().await;
        let publication = LINK
            .lock()
            .await
            .prepare_publication(Instant::now().as_millis(), &readings);

        let Some(publication) = publication else {
            continue;
        };

        // Sent outside the lock so the receiver is never blocked on the radio
        match tx
            .send(&publication.destination.octets(), &publication.payload)
            .await
        {
            Ok(status) => {
                info!(
                    "-->[ESPN] Last packet sent to {} with status: {=str}",
                    publication.destination,
                    status.as_str()
                );
                if status == SendStatus::Delivered {
                    debug!("-->[ESPN] Sent with success (reading {})", publication.reading_id);
                }
            }
            Err(e) => {
                error!("-->[ESPN] Error {:?} sending the data: {=str}", e, e.description());
            }
        }
    }
}
