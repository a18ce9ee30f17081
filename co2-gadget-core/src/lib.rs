//! Board-agnostic core logic for the CO2 Gadget firmware
//!
//! This crate contains the application logic that does not depend on
//! specific hardware implementations:
//!
//! - User preference model and its defaults
//! - Preference persistence over any [`co2_gadget_hal::FlashStorage`]
//! - ESP-NOW link state: publishing telemetry, accepting commands
//! - Sensor reading snapshot shared with the sensor driver
//!
//! Nothing here logs. Operations return outcomes and errors, and the
//! firmware decides what to report.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod link;
pub mod readings;
pub mod storage;
