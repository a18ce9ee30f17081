//! User preference persistence
//!
//! Loads and saves preferences through the flash-backed store and
//! reports what happened.

use defmt::*;

use co2_gadget_core::config::Preferences;
use co2_gadget_core::storage::{KeyFailure, PreferenceStore};
use co2_gadget_hal_esp32::Esp32FlashStorage;

/// Preference store on the ESP32 `nvs` partition
pub type PreferenceStorage = PreferenceStore<Esp32FlashStorage<'static>>;

/// Load preferences from flash
///
/// Never fails: unreadable keys fall back to their defaults and are
/// reported here.
pub async fn load_preferences(store: &mut PreferenceStorage) -> Preferences {
    let loaded = store.load().await;

    for failure in &loaded.failures {
        log_failure("read", failure);
    }
    if !loaded.preferences.active_wifi {
        debug!("[PREF] Wi-Fi disabled, MQTT forced off");
    }

    log_preferences_summary(&loaded.preferences);
    loaded.preferences
}

/// Save preferences to flash
///
/// Returns false if any key could not be written. Keys that were written
/// stay written.
pub async fn save_preferences(store: &mut PreferenceStorage, preferences: &Preferences) -> bool {
    match store.save(preferences).await {
        Ok(()) => {
            info!("[PREF] Preferences saved");
            true
        }
        Err(failures) => {
            for failure in &failures {
                log_failure("write", failure);
            }
            error!("[PREF] {} preference(s) not saved", failures.len());
            false
        }
    }
}

fn log_failure(operation: &str, failure: &KeyFailure) {
    warn!(
        "[PREF] Failed to {=str} {=str}: {:?}",
        operation,
        failure.key.name(),
        failure.error
    );
}

/// Log the loaded preferences
fn log_preferences_summary(prefs: &Preferences) {
    info!("[PREF] LOADED PREFERENCES FROM NVR:");
    info!("[PREF]   customCalibrationValue: {}", prefs.custom_calibration_value);
    info!("[PREF]   altidudeMeters: {}", prefs.altitude_meters);
    info!("[PREF]   autoSelfCalibration: {=str}", enabled(prefs.auto_self_calibration));
    info!("[PREF]   co2OrangeRange: {}", prefs.co2_orange_range);
    info!("[PREF]   co2RedRange: {}", prefs.co2_red_range);
    info!("[PREF]   TFTBrightness: {}", prefs.tft_brightness);
    info!("[PREF]   activeBLE: {=str}", enabled(prefs.active_ble));
    info!("[PREF]   activeWIFI: {=str}", enabled(prefs.active_wifi));
    info!("[PREF]   activeMQTT: {=str}", enabled(prefs.active_mqtt));
    info!("[PREF]   rootTopic: {=str}", prefs.root_topic.as_str());
    info!("[PREF]   mqttClientId: {=str}", prefs.mqtt_client_id.as_str());
    info!("[PREF]   mqttBroker: {=str}", prefs.mqtt_broker.as_str());
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "Enabled"
    } else {
        "Disabled"
    }
}
