//! Calibration request task
//!
//! Persists calibration values requested over ESP-NOW and hands them to
//! the sensor driver.

use defmt::*;

use co2_gadget_core::config::Preferences;

use crate::channels::{CALIBRATION_PENDING, CALIBRATION_REQUEST, LINK};
use crate::config::{save_preferences, PreferenceStorage};

/// Calibration task - owns the preference store after boot
///
/// Saving happens here so flash writes never stall the radio tasks.
#[embassy_executor::task]
pub async fn calibration_task(mut store: PreferenceStorage, mut preferences: Preferences) {
    info!("Calibration task started");

    loop {
        CALIBRATION_REQUEST.wait().await;

        // The latch holds the newest request if several arrived meanwhile
        let Some(value) = LINK.lock().await.take_pending_calibration() else {
            continue;
        };

        info!("[PREF] Calibration value {} ppm requested", value);

        preferences.custom_calibration_value = u32::from(value);
        if !save_preferences(&mut store, &preferences).await {
            warn!("[PREF] Calibration value not persisted, applying anyway");
        }

        CALIBRATION_PENDING.signal(value);
    }
}
