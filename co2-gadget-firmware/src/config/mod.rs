//! Firmware configuration
//!
//! Build-time link settings come from gadget.toml (see build.rs); user
//! preferences are loaded from flash at boot.

pub mod preferences;

use co2_gadget_core::config::LinkConfig;
use co2_gadget_protocol::MacAddress;

include!(concat!(env!("OUT_DIR"), "/link_config.rs"));

pub use preferences::{load_preferences, save_preferences, PreferenceStorage};
