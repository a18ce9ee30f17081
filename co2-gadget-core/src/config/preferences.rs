//! User preference definitions
//!
//! Settings the user changes from the menu, BLE or the web portal. Each
//! field is stored under its own key; see [`crate::storage`].

use heapless::String;

/// Maximum MQTT root topic length
pub const MAX_TOPIC_LEN: usize = 32;

/// Maximum MQTT client id length
pub const MAX_CLIENT_ID_LEN: usize = 32;

/// Maximum MQTT broker host length
pub const MAX_BROKER_LEN: usize = 64;

/// Default forced-calibration target (outdoor air, ppm)
pub const DEFAULT_CALIBRATION_PPM: u32 = 415;

/// Default orange threshold (ppm)
pub const DEFAULT_CO2_ORANGE: u32 = 700;

/// Default red threshold (ppm)
pub const DEFAULT_CO2_RED: u32 = 1000;

/// Default backlight brightness
pub const DEFAULT_TFT_BRIGHTNESS: u32 = 100;

/// Default MQTT root topic
pub const DEFAULT_ROOT_TOPIC: &str = "CO2-Gadget";

/// Default MQTT client id
pub const DEFAULT_MQTT_CLIENT_ID: &str = "CO2-Gadget";

/// Default MQTT broker
pub const DEFAULT_MQTT_BROKER: &str = "test.mosquitto.org";

/// User preferences
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Preferences {
    /// Target ppm for forced calibration
    pub custom_calibration_value: u32,
    /// Installation altitude in meters
    pub altitude_meters: u32,
    /// Sensor automatic self-calibration
    pub auto_self_calibration: bool,
    /// CO2 level where the display turns orange
    pub co2_orange_range: u32,
    /// CO2 level where the display turns red
    pub co2_red_range: u32,
    /// Backlight brightness
    pub tft_brightness: u32,
    /// Bluetooth enabled
    pub active_ble: bool,
    /// Wi-Fi enabled
    pub active_wifi: bool,
    /// MQTT publishing enabled (requires Wi-Fi)
    pub active_mqtt: bool,
    /// MQTT root topic
    pub root_topic: String<MAX_TOPIC_LEN>,
    /// MQTT client id
    pub mqtt_client_id: String<MAX_CLIENT_ID_LEN>,
    /// MQTT broker host
    pub mqtt_broker: String<MAX_BROKER_LEN>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            custom_calibration_value: DEFAULT_CALIBRATION_PPM,
            altitude_meters: 0,
            auto_self_calibration: false,
            co2_orange_range: DEFAULT_CO2_ORANGE,
            co2_red_range: DEFAULT_CO2_RED,
            tft_brightness: DEFAULT_TFT_BRIGHTNESS,
            active_ble: true,
            active_wifi: false,
            active_mqtt: false,
            root_topic: bounded(DEFAULT_ROOT_TOPIC),
            mqtt_client_id: bounded(DEFAULT_MQTT_CLIENT_ID),
            mqtt_broker: bounded(DEFAULT_MQTT_BROKER),
        }
    }
}

impl Preferences {
    /// Apply cross-field rules
    ///
    /// MQTT needs Wi-Fi: with Wi-Fi off, MQTT is forced off. Returns true
    /// when the rule applied and the MQTT flag should be written back.
    pub fn enforce_dependencies(&mut self) -> bool {
        if self.active_wifi {
            return false;
        }
        self.active_mqtt = false;
        true
    }
}

/// Copy `s` into a bounded string, truncating at a character boundary
pub fn bounded<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.custom_calibration_value, 415);
        assert_eq!(prefs.altitude_meters, 0);
        assert!(!prefs.auto_self_calibration);
        assert_eq!(prefs.co2_orange_range, 700);
        assert_eq!(prefs.co2_red_range, 1000);
        assert_eq!(prefs.tft_brightness, 100);
        assert!(prefs.active_ble);
        assert!(!prefs.active_wifi);
        assert!(!prefs.active_mqtt);
        assert_eq!(prefs.root_topic.as_str(), "CO2-Gadget");
        assert_eq!(prefs.mqtt_client_id.as_str(), "CO2-Gadget");
        assert_eq!(prefs.mqtt_broker.as_str(), "test.mosquitto.org");
    }

    #[test]
    fn test_mqtt_disabled_without_wifi() {
        let mut prefs = Preferences {
            active_wifi: false,
            active_mqtt: true,
            ..Default::default()
        };
        assert!(prefs.enforce_dependencies());
        assert!(!prefs.active_mqtt);
    }

    #[test]
    fn test_mqtt_kept_with_wifi() {
        let mut prefs = Preferences {
            active_wifi: true,
            active_mqtt: true,
            ..Default::default()
        };
        assert!(!prefs.enforce_dependencies());
        assert!(prefs.active_mqtt);
    }

    #[test]
    fn test_bounded_truncates() {
        let s: String<4> = bounded("CO2-Gadget");
        assert_eq!(s.as_str(), "CO2-");

        // Multi-byte character that would straddle the limit is dropped
        let s: String<4> = bounded("abcé");
        assert_eq!(s.as_str(), "abc");
    }
}
