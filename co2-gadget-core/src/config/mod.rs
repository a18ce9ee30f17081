//! Configuration types
//!
//! Link settings fixed at build time and user preferences kept in flash.

pub mod link;
pub mod preferences;

pub use link::*;
pub use preferences::*;
