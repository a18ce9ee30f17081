//! Preference persistence
//!
//! Reads and writes [`Preferences`](crate::config::Preferences) one key at
//! a time through any [`co2_gadget_hal::FlashStorage`].

pub mod preferences;

pub use preferences::{KeyFailure, KeyFailures, Loaded, PreferenceError, PreferenceStore};

#[cfg(test)]
pub(crate) mod memory;
