//! ESP32-specific HAL for the CO2 Gadget firmware
//!
//! Implements the shared `co2-gadget-hal` traits on the ESP32:
//!
//! - Flash storage on the `nvs` partition (implements
//!   `co2_gadget_hal::FlashStorage`)
//! - ESP-NOW radio (implements `RadioControl`, `RadioTx`, `RadioRx`)

#![no_std]

pub mod flash;
pub mod radio;

pub use flash::Esp32FlashStorage;
pub use radio::{EspNowControl, EspNowRx, EspNowTx};
