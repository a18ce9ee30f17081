//! CO2 Gadget Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the gadget logic is
//! written against. Chip-specific HALs implement them, which keeps the link
//! and preference logic testable on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  co2-gadget-core / co2-gadget-firmware  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  co2-gadget-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!          ┌─────────────────────┐
//!          │ co2-gadget-hal-esp32│
//!          └─────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`radio::RadioControl`], [`radio::RadioTx`], [`radio::RadioRx`] - Peer-to-peer datagram radio
//! - [`flash::FlashStorage`] - Persistent key-value storage

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod flash;
pub mod radio;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use radio::{HwAddr, PeerConfig, RadioControl, RadioError, RadioRx, RadioTx, ReceivedFrame, SendStatus};
