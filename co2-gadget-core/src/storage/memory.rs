//! In-memory flash storage for tests

use std::collections::{HashMap, HashSet};
use std::vec::Vec;

use co2_gadget_hal::{FlashError, FlashStorage, StorageKey};

/// Flash storage backed by a hash map, with per-key fault injection
#[derive(Default)]
pub(crate) struct MemoryStorage {
    values: HashMap<StorageKey, Vec<u8>>,
    failing_reads: HashSet<StorageKey>,
    failing_writes: HashSet<StorageKey>,
}

impl MemoryStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every read of `key` fail
    pub(crate) fn fail_reads(&mut self, key: StorageKey) {
        self.failing_reads.insert(key);
    }

    /// Make every write of `key` fail
    pub(crate) fn fail_writes(&mut self, key: StorageKey) {
        self.failing_writes.insert(key);
    }

    /// Store raw bytes, bypassing encoding
    pub(crate) fn insert_raw(&mut self, key: StorageKey, bytes: &[u8]) {
        self.values.insert(key, bytes.to_vec());
    }

    /// Raw bytes stored under `key`
    pub(crate) fn raw(&mut self, key: StorageKey) -> Option<&[u8]> {
        self.values.get(&key).map(Vec::as_slice)
    }
}

impl FlashStorage for MemoryStorage {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        if self.failing_reads.contains(&key) {
            return Err(FlashError::Storage);
        }
        let value = self.values.get(&key).ok_or(FlashError::NotFound)?;
        if value.len() > buffer.len() {
            return Err(FlashError::BufferTooSmall);
        }
        buffer[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.failing_writes.contains(&key) {
            return Err(FlashError::Flash);
        }
        self.values.insert(key, data.to_vec());
        Ok(())
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        self.values.contains_key(&key)
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        self.values.clear();
        Ok(())
    }
}
