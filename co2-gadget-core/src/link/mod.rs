//! Radio link to the gateway
//!
//! The gadget pushes a telemetry record to a fixed gateway at a fixed
//! interval and accepts command records addressed to its board id.

pub mod espnow;

pub use espnow::{EspNowLink, LinkError, Publication, ReceiveOutcome};
