//! Flash storage driver for ESP32
//!
//! Uses sequential-storage for wear-leveled key-value storage in the
//! `nvs` partition of the default partition table.
//!
//! Implements the `FlashStorage` trait from `co2-gadget-hal`.

use co2_gadget_hal::{FlashError, StorageKey};
use embassy_embedded_hal::adapter::BlockingAsync;
use esp_hal::peripherals::FLASH;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

/// Start of the `nvs` partition
pub const PREFERENCES_START: u32 = 0x9000;

/// End of the `nvs` partition (exclusive)
pub const PREFERENCES_END: u32 = 0xF000;

/// Flash range used for preferences
pub const PREFERENCES_RANGE: core::ops::Range<u32> = PREFERENCES_START..PREFERENCES_END;

/// Scratch buffer for one stored item (key, header and value)
const ITEM_BUFFER_SIZE: usize = 128;

/// ESP32 flash storage implementation
pub struct Esp32FlashStorage<'d> {
    flash: BlockingAsync<esp_storage::FlashStorage<'d>>,
}

impl<'d> Esp32FlashStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: FLASH<'d>) -> Self {
        Self {
            flash: BlockingAsync::new(esp_storage::FlashStorage::new(flash)),
        }
    }
}

impl<'d> co2_gadget_hal::FlashStorage for Esp32FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            PREFERENCES_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(sequential_storage::Error::Corrupted { .. }) => Err(FlashError::Corrupted),
            Err(_) => Err(FlashError::Storage),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        map::store_item(
            &mut self.flash,
            PREFERENCES_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => FlashError::Full,
            sequential_storage::Error::Storage { .. } => FlashError::Flash,
            _ => FlashError::Storage,
        })
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        matches!(
            map::fetch_item::<StorageKey, &[u8], _>(
                &mut self.flash,
                PREFERENCES_RANGE,
                &mut NoCache::new(),
                &mut data_buffer,
                &key,
            )
            .await,
            Ok(Some(_))
        )
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        sequential_storage::erase_all(&mut self.flash, PREFERENCES_RANGE)
            .await
            .map_err(|_| FlashError::Flash)
    }
}
