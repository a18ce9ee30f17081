//! CO2 Gadget ESP-NOW protocol
//!
//! This crate defines the record exchanged between a CO2 Gadget and its
//! ESP-NOW gateway. The same record carries telemetry from the gadget and
//! commands from the gateway.
//!
//! # Protocol Overview
//!
//! Every frame is exactly one record. The layout is the in-memory layout of
//! the C struct the gateway firmware uses (4-byte alignment, little-endian):
//! ```text
//! ┌──────┬─────┬──────────┬──────┬──────┬─────┬─────┬─────────┬────────────┬─────────┬─────────┬─────┐
//! │ TYPE │ pad │ BOARD_ID │ TEMP │ HUM  │ CO2 │ pad │ BATTERY │ READING_ID │ COMMAND │ PARAM   │ pad │
//! │ u8   │ 3B  │ i32      │ f32  │ f32  │ u16 │ 2B  │ f32     │ i32        │ i32     │ u16     │ 2B  │
//! └──────┴─────┴──────────┴──────┴──────┴─────┴─────┴─────────┴────────────┴─────────┴─────────┴─────┘
//! ```
//!
//! There is no framing, checksum or version field. A frame whose length is
//! not [`RECORD_SIZE`] is rejected.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod mac;
pub mod record;

pub use command::{Command, MessageType};
pub use mac::MacAddress;
pub use record::{RecordError, TelemetryRecord, RECORD_SIZE};
