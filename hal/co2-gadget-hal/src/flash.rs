//! Flash storage abstractions
//!
//! Provides traits for persistent key-value storage that can be implemented
//! by chip-specific HALs using their flash memory.

/// Storage keys for user preferences
///
/// Every preference is stored under its own key so settings can be read
/// and written individually. The byte value is what goes to flash; the
/// [`name`](StorageKey::name) is the key text devices migrated from the
/// Arduino firmware know their settings by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Target ppm for forced calibration
    CustomCalibrationValue = 0,
    /// Installation altitude for pressure compensation
    AltitudeMeters = 1,
    /// Sensor automatic self-calibration enabled
    AutoSelfCalibration = 2,
    /// CO2 level where the display turns orange
    Co2OrangeRange = 3,
    /// CO2 level where the display turns red
    Co2RedRange = 4,
    /// Display backlight brightness
    TftBrightness = 5,
    /// Bluetooth enabled
    ActiveBle = 6,
    /// Wi-Fi enabled
    ActiveWifi = 7,
    /// MQTT publishing enabled
    ActiveMqtt = 8,
    /// MQTT root topic
    RootTopic = 9,
    /// MQTT client identifier
    MqttClientId = 10,
    /// MQTT broker host
    MqttBroker = 11,
}

impl StorageKey {
    /// Number of keys
    pub const COUNT: usize = 12;

    /// All keys in storage order
    pub const ALL: [StorageKey; Self::COUNT] = [
        StorageKey::CustomCalibrationValue,
        StorageKey::AltitudeMeters,
        StorageKey::AutoSelfCalibration,
        StorageKey::Co2OrangeRange,
        StorageKey::Co2RedRange,
        StorageKey::TftBrightness,
        StorageKey::ActiveBle,
        StorageKey::ActiveWifi,
        StorageKey::ActiveMqtt,
        StorageKey::RootTopic,
        StorageKey::MqttClientId,
        StorageKey::MqttBroker,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// NVS key text (max 15 characters)
    pub fn name(self) -> &'static str {
        match self {
            StorageKey::CustomCalibrationValue => "customCalValue",
            // Misspelling kept for compatibility with existing devices
            StorageKey::AltitudeMeters => "altidudeMeters",
            StorageKey::AutoSelfCalibration => "autoSelfCal",
            StorageKey::Co2OrangeRange => "co2OrangeRange",
            StorageKey::Co2RedRange => "co2RedRange",
            StorageKey::TftBrightness => "TFTBrightness",
            StorageKey::ActiveBle => "activeBLE",
            StorageKey::ActiveWifi => "activeWIFI",
            StorageKey::ActiveMqtt => "activeMQTT",
            StorageKey::RootTopic => "rootTopic",
            StorageKey::MqttClientId => "mqttClientId",
            StorageKey::MqttBroker => "mqttBroker",
        }
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Flash storage trait
///
/// Provides wear-leveled key-value storage for preference data.
/// Implementations should handle:
/// - Wear leveling across flash sectors
/// - Data integrity (CRC or similar)
///
/// Writes are per key. There is no transaction spanning several keys.
pub trait FlashStorage {
    /// Read a value by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or [`FlashError::NotFound`] if the key
    /// was never written.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write a value by key, replacing any previous value
    fn write(&mut self, key: StorageKey, data: &[u8]) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> impl core::future::Future<Output = bool>;

    /// Erase all stored data
    ///
    /// This erases the entire preference partition. Use with caution!
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_byte_roundtrip() {
        for key in StorageKey::ALL {
            assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        }
    }

    #[test]
    fn test_unknown_key_byte() {
        assert_eq!(StorageKey::from_u8(StorageKey::COUNT as u8), None);
        assert_eq!(StorageKey::from_u8(0xFF), None);
    }

    #[test]
    fn test_key_names_fit_nvs() {
        for key in StorageKey::ALL {
            assert!(!key.name().is_empty());
            assert!(key.name().len() <= 15, "{} too long", key.name());
        }
    }

    #[test]
    fn test_key_names_unique() {
        for (i, a) in StorageKey::ALL.iter().enumerate() {
            for b in &StorageKey::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
