//! Embassy async tasks
//!
//! Each task runs independently and communicates via the shared state in
//! `channels`.

pub mod calibration;
pub mod espnow_rx;
pub mod espnow_tx;

pub use calibration::calibration_task;
pub use espnow_rx::espnow_rx_task;
pub use espnow_tx::espnow_tx_task;
