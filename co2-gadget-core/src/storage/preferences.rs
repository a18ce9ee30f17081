//! Preference load/save
//!
//! Each setting lives under its own [`StorageKey`] and is encoded with
//! postcard. Loading falls back to the default for any key that is absent
//! or unreadable; saving writes every key and keeps going past failures.
//! There is no transaction: a failure mid-save leaves the keys written so
//! far in place.

use co2_gadget_hal::{FlashError, FlashStorage, StorageKey};
use heapless::{String, Vec};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Preferences;

/// Largest encoded value (64-byte string plus its length prefix)
const MAX_VALUE_SIZE: usize = 72;

/// Per-key persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PreferenceError {
    /// Flash operation failed
    Flash(FlashError),
    /// Serialization failed
    Serialize,
    /// Stored bytes are not a valid value
    Deserialize,
    /// Stored string exceeds the field capacity
    TooLong,
}

impl From<FlashError> for PreferenceError {
    fn from(e: FlashError) -> Self {
        PreferenceError::Flash(e)
    }
}

/// A key whose read or write failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyFailure {
    /// Key involved
    pub key: StorageKey,
    /// What went wrong
    pub error: PreferenceError,
}

/// Failures collected over one load or save
///
/// One slot per key plus the dependency write-back during load.
pub type KeyFailures = Vec<KeyFailure, { StorageKey::COUNT + 1 }>;

/// Result of [`PreferenceStore::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Loaded {
    /// Loaded preferences, defaults filled in
    pub preferences: Preferences,
    /// Keys that could not be read or written back
    pub failures: KeyFailures,
}

/// Preference persistence manager
///
/// Handles loading and saving user preferences through flash storage.
pub struct PreferenceStore<S> {
    storage: S,
}

impl<S: FlashStorage> PreferenceStore<S> {
    /// Create a new preference store
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Consume this store and return the underlying storage
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Load all preferences
    ///
    /// Missing keys take their defaults silently; any other read error is
    /// recorded in [`Loaded::failures`] and the default is used. The MQTT
    /// dependency rule is applied afterwards and, when it applies, the MQTT
    /// flag is written back immediately.
    pub async fn load(&mut self) -> Loaded {
        let defaults = Preferences::default();
        let mut failures = KeyFailures::new();

        let mut preferences = Preferences {
            custom_calibration_value: self
                .get(StorageKey::CustomCalibrationValue, defaults.custom_calibration_value, &mut failures)
                .await,
            altitude_meters: self
                .get(StorageKey::AltitudeMeters, defaults.altitude_meters, &mut failures)
                .await,
            auto_self_calibration: self
                .get(StorageKey::AutoSelfCalibration, defaults.auto_self_calibration, &mut failures)
                .await,
            co2_orange_range: self
                .get(StorageKey::Co2OrangeRange, defaults.co2_orange_range, &mut failures)
                .await,
            co2_red_range: self
                .get(StorageKey::Co2RedRange, defaults.co2_red_range, &mut failures)
                .await,
            tft_brightness: self
                .get(StorageKey::TftBrightness, defaults.tft_brightness, &mut failures)
                .await,
            active_ble: self
                .get(StorageKey::ActiveBle, defaults.active_ble, &mut failures)
                .await,
            active_wifi: self
                .get(StorageKey::ActiveWifi, defaults.active_wifi, &mut failures)
                .await,
            active_mqtt: self
                .get(StorageKey::ActiveMqtt, defaults.active_mqtt, &mut failures)
                .await,
            root_topic: self
                .get_str(StorageKey::RootTopic, defaults.root_topic, &mut failures)
                .await,
            mqtt_client_id: self
                .get_str(StorageKey::MqttClientId, defaults.mqtt_client_id, &mut failures)
                .await,
            mqtt_broker: self
                .get_str(StorageKey::MqttBroker, defaults.mqtt_broker, &mut failures)
                .await,
        };

        if preferences.enforce_dependencies() {
            if let Err(error) = self.put(StorageKey::ActiveMqtt, &preferences.active_mqtt).await {
                record(&mut failures, StorageKey::ActiveMqtt, error);
            }
        }

        Loaded {
            preferences,
            failures,
        }
    }

    /// Save all preferences
    ///
    /// Every key is written even if an earlier one failed. Returns the
    /// failed keys, if any.
    pub async fn save(&mut self, preferences: &Preferences) -> Result<(), KeyFailures> {
        let mut failures = KeyFailures::new();

        let results = [
            (
                StorageKey::CustomCalibrationValue,
                self.put(StorageKey::CustomCalibrationValue, &preferences.custom_calibration_value).await,
            ),
            (
                StorageKey::AltitudeMeters,
                self.put(StorageKey::AltitudeMeters, &preferences.altitude_meters).await,
            ),
            (
                StorageKey::AutoSelfCalibration,
                self.put(StorageKey::AutoSelfCalibration, &preferences.auto_self_calibration).await,
            ),
            (
                StorageKey::Co2OrangeRange,
                self.put(StorageKey::Co2OrangeRange, &preferences.co2_orange_range).await,
            ),
            (
                StorageKey::Co2RedRange,
                self.put(StorageKey::Co2RedRange, &preferences.co2_red_range).await,
            ),
            (
                StorageKey::TftBrightness,
                self.put(StorageKey::TftBrightness, &preferences.tft_brightness).await,
            ),
            (
                StorageKey::ActiveBle,
                self.put(StorageKey::ActiveBle, &preferences.active_ble).await,
            ),
            (
                StorageKey::ActiveWifi,
                self.put(StorageKey::ActiveWifi, &preferences.active_wifi).await,
            ),
            (
                StorageKey::ActiveMqtt,
                self.put(StorageKey::ActiveMqtt, &preferences.active_mqtt).await,
            ),
            (
                StorageKey::RootTopic,
                self.put(StorageKey::RootTopic, preferences.root_topic.as_str()).await,
            ),
            (
                StorageKey::MqttClientId,
                self.put(StorageKey::MqttClientId, preferences.mqtt_client_id.as_str()).await,
            ),
            (
                StorageKey::MqttBroker,
                self.put(StorageKey::MqttBroker, preferences.mqtt_broker.as_str()).await,
            ),
        ];

        for (key, result) in results {
            if let Err(error) = result {
                record(&mut failures, key, error);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }

    /// Erase every stored preference
    ///
    /// The next [`load`](Self::load) returns the defaults.
    pub async fn reset(&mut self) -> Result<(), PreferenceError> {
        self.storage.erase_all().await.map_err(PreferenceError::Flash)
    }

    /// Read a scalar, falling back to `default`
    async fn get<T: DeserializeOwned>(&mut self, key: StorageKey, default: T, failures: &mut KeyFailures) -> T {
        let mut buffer = [0u8; MAX_VALUE_SIZE];
        match self.read(key, &mut buffer).await {
            Ok(Some(len)) => match postcard::from_bytes(&buffer[..len]) {
                Ok(value) => value,
                Err(_) => {
                    record(failures, key, PreferenceError::Deserialize);
                    default
                }
            },
            Ok(None) => default,
            Err(error) => {
                record(failures, key, error);
                default
            }
        }
    }

    /// Read a string, falling back to `default`
    async fn get_str<const N: usize>(
        &mut self,
        key: StorageKey,
        default: String<N>,
        failures: &mut KeyFailures,
    ) -> String<N> {
        let mut buffer = [0u8; MAX_VALUE_SIZE];
        let len = match self.read(key, &mut buffer).await {
            Ok(Some(len)) => len,
            Ok(None) => return default,
            Err(error) => {
                record(failures, key, error);
                return default;
            }
        };

        let text: &str = match postcard::from_bytes(&buffer[..len]) {
            Ok(text) => text,
            Err(_) => {
                record(failures, key, PreferenceError::Deserialize);
                return default;
            }
        };

        let mut value = String::new();
        if value.push_str(text).is_err() {
            record(failures, key, PreferenceError::TooLong);
            return default;
        }
        value
    }

    /// Read raw bytes; `Ok(None)` when the key was never written
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<Option<usize>, PreferenceError> {
        match self.storage.read(key, buffer).await {
            Ok(len) => Ok(Some(len)),
            Err(FlashError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Encode and write one value
    async fn put<T: Serialize + ?Sized>(&mut self, key: StorageKey, value: &T) -> Result<(), PreferenceError> {
        let mut buffer = [0u8; MAX_VALUE_SIZE];
        let bytes = postcard::to_slice(value, &mut buffer).map_err(|_| PreferenceError::Serialize)?;
        self.storage.write(key, bytes).await?;
        Ok(())
    }
}

fn record(failures: &mut KeyFailures, key: StorageKey, error: PreferenceError) {
    // Capacity covers every key plus the write-back
    let _ = failures.push(KeyFailure { key, error });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{bounded, MAX_BROKER_LEN};
    use crate::storage::memory::MemoryStorage;
    use embassy_futures::block_on;
    use proptest::prelude::*;

    fn custom() -> Preferences {
        Preferences {
            custom_calibration_value: 420,
            altitude_meters: 650,
            auto_self_calibration: true,
            co2_orange_range: 800,
            co2_red_range: 1200,
            tft_brightness: 40,
            active_ble: false,
            active_wifi: true,
            active_mqtt: true,
            root_topic: bounded("home/office"),
            mqtt_client_id: bounded("gadget-7"),
            mqtt_broker: bounded("192.168.1.10"),
        }
    }

    #[test]
    fn test_load_empty_store_gives_defaults() {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        let loaded = block_on(store.load());

        assert_eq!(loaded.preferences, Preferences::default());
        assert!(loaded.failures.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        block_on(store.save(&custom())).unwrap();

        let loaded = block_on(store.load());
        assert_eq!(loaded.preferences, custom());
        assert!(loaded.failures.is_empty());
    }

    #[test]
    fn test_save_writes_every_key() {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        block_on(store.save(&Preferences::default())).unwrap();

        let mut storage = store.into_storage();
        for key in StorageKey::ALL {
            assert!(block_on(storage.exists(key)), "{} not written", key.name());
        }
    }

    #[test]
    fn test_load_disables_mqtt_without_wifi_and_persists() {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        let stored = Preferences {
            active_wifi: false,
            active_mqtt: true,
            ..custom()
        };
        block_on(store.save(&stored)).unwrap();

        let loaded = block_on(store.load());
        assert!(!loaded.preferences.active_mqtt);

        // The rule was written back, not just applied in memory
        let mut storage = store.into_storage();
        assert_eq!(storage.raw(StorageKey::ActiveMqtt), Some(&[0u8][..]));
    }

    #[test]
    fn test_load_first_boot_writes_mqtt_flag() {
        // Default has Wi-Fi off, so even an empty store gets activeMQTT
        let mut store = PreferenceStore::new(MemoryStorage::new());
        block_on(store.load());

        let mut storage = store.into_storage();
        assert!(block_on(storage.exists(StorageKey::ActiveMqtt)));
        assert!(!block_on(storage.exists(StorageKey::ActiveWifi)));
    }

    #[test]
    fn test_unreadable_key_falls_back_to_default() {
        let mut storage = MemoryStorage::new();
        storage.fail_reads(StorageKey::Co2RedRange);
        let mut store = PreferenceStore::new(storage);
        block_on(store.save(&custom())).unwrap();

        let loaded = block_on(store.load());
        assert_eq!(loaded.preferences.co2_red_range, 1000);
        assert_eq!(loaded.preferences.co2_orange_range, 800);
        assert_eq!(
            loaded.failures.as_slice(),
            &[KeyFailure {
                key: StorageKey::Co2RedRange,
                error: PreferenceError::Flash(FlashError::Storage),
            }]
        );
    }

    #[test]
    fn test_corrupt_value_falls_back_to_default() {
        let mut storage = MemoryStorage::new();
        // A bool must be 0 or 1
        storage.insert_raw(StorageKey::ActiveBle, &[7]);
        let mut store = PreferenceStore::new(storage);

        let loaded = block_on(store.load());
        assert!(loaded.preferences.active_ble);
        assert_eq!(loaded.failures[0].key, StorageKey::ActiveBle);
        assert_eq!(loaded.failures[0].error, PreferenceError::Deserialize);
    }

    #[test]
    fn test_oversized_string_falls_back_to_default() {
        let mut storage = MemoryStorage::new();
        let long = [b'x'; 40];
        let mut raw = [0u8; 41];
        raw[0] = 40; // varint length prefix
        raw[1..].copy_from_slice(&long);
        storage.insert_raw(StorageKey::RootTopic, &raw);
        let mut store = PreferenceStore::new(storage);

        let loaded = block_on(store.load());
        assert_eq!(loaded.preferences.root_topic.as_str(), "CO2-Gadget");
        assert_eq!(loaded.failures[0].error, PreferenceError::TooLong);
    }

    #[test]
    fn test_save_continues_past_failure() {
        let mut storage = MemoryStorage::new();
        storage.fail_writes(StorageKey::Co2OrangeRange);
        let mut store = PreferenceStore::new(storage);

        let failures = block_on(store.save(&custom())).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key, StorageKey::Co2OrangeRange);

        // Keys before and after the failure were still written
        let mut storage = store.into_storage();
        assert!(block_on(storage.exists(StorageKey::AutoSelfCalibration)));
        assert!(block_on(storage.exists(StorageKey::MqttBroker)));
        assert!(!block_on(storage.exists(StorageKey::Co2OrangeRange)));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut store = PreferenceStore::new(MemoryStorage::new());
        block_on(store.save(&custom())).unwrap();
        block_on(store.reset()).unwrap();

        let loaded = block_on(store.load());
        assert_eq!(loaded.preferences, Preferences::default());
    }

    proptest! {
        #[test]
        fn prop_save_load_identity(
            calibration in any::<u32>(),
            altitude in any::<u32>(),
            auto_cal in any::<bool>(),
            (orange, red) in (any::<u32>(), any::<u32>()),
            brightness in any::<u32>(),
            (ble, wifi, mqtt) in (any::<bool>(), any::<bool>(), any::<bool>()),
            topic in "[a-zA-Z0-9/_-]{0,32}",
            client_id in "[a-zA-Z0-9_-]{0,32}",
            broker in "[a-z0-9.-]{0,64}",
        ) {
            let prefs = Preferences {
                custom_calibration_value: calibration,
                altitude_meters: altitude,
                auto_self_calibration: auto_cal,
                co2_orange_range: orange,
                co2_red_range: red,
                tft_brightness: brightness,
                active_ble: ble,
                active_wifi: wifi,
                active_mqtt: mqtt,
                root_topic: bounded(&topic),
                mqtt_client_id: bounded(&client_id),
                mqtt_broker: bounded::<MAX_BROKER_LEN>(&broker),
            };

            let mut store = PreferenceStore::new(MemoryStorage::new());
            block_on(store.save(&prefs)).unwrap();
            let loaded = block_on(store.load());

            let mut expected = prefs.clone();
            expected.enforce_dependencies();
            prop_assert_eq!(&loaded.preferences, &expected);
            prop_assert!(loaded.preferences.active_wifi || !loaded.preferences.active_mqtt);
        }
    }
}
