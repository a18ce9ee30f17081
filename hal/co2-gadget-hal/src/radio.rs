//! Peer-to-peer radio abstractions
//!
//! Provides traits for a connectionless datagram radio (ESP-NOW on the
//! ESP32). Frames are addressed by hardware address; there is no
//! connection, sequencing or retransmission above the radio's own
//! link-layer acknowledgement.

/// 6-byte hardware (MAC) address
pub type HwAddr = [u8; 6];

/// Peer registration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerConfig {
    /// Peer hardware address
    pub address: HwAddr,
    /// Radio channel the peer listens on
    pub channel: u8,
    /// Encrypt frames to this peer
    pub encrypt: bool,
}

/// Outcome reported by the send-complete callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendStatus {
    /// Frame acknowledged by the peer
    Delivered,
    /// Frame sent but not acknowledged
    Failed,
}

impl SendStatus {
    /// Text for log output
    pub fn as_str(self) -> &'static str {
        match self {
            SendStatus::Delivered => "Delivery Success",
            SendStatus::Failed => "Delivery Fail",
        }
    }
}

/// Errors returned by the radio stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// Radio stack not initialized
    NotInitialized,
    /// Invalid argument (bad channel, oversized frame, ...)
    InvalidArgument,
    /// Internal stack error
    Internal,
    /// Out of memory
    OutOfMemory,
    /// Peer is not registered
    PeerNotFound,
    /// Peer is already registered
    PeerExists,
    /// Peer table is full
    PeerListFull,
    /// Any other vendor error code
    Other(u32),
}

impl RadioError {
    /// Operator-facing description of the error
    pub fn description(self) -> &'static str {
        match self {
            RadioError::NotInitialized => "ESPNOW not Init.",
            RadioError::InvalidArgument => "Invalid Argument",
            RadioError::Internal => "Internal Error",
            RadioError::OutOfMemory => "Out of memory",
            RadioError::PeerNotFound => "Peer not found.",
            RadioError::PeerExists => "Peer already exists",
            RadioError::PeerListFull => "Peer list full",
            RadioError::Other(_) => "Not sure what happened",
        }
    }
}

/// A received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceivedFrame {
    /// Sender hardware address
    pub source: HwAddr,
    /// Length of the frame as received
    ///
    /// May exceed the receive buffer; only `min(len, buffer.len())` bytes
    /// were copied in that case.
    pub len: usize,
}

/// Radio control plane
///
/// Channel and peer table management. These calls do not block.
pub trait RadioControl {
    /// Tune the radio to a channel (1-14)
    fn set_channel(&mut self, channel: u8) -> Result<(), RadioError>;

    /// Register a peer so frames can be unicast to it
    fn add_peer(&mut self, peer: &PeerConfig) -> Result<(), RadioError>;

    /// Remove a registered peer
    fn remove_peer(&mut self, address: &HwAddr) -> Result<(), RadioError>;
}

/// Radio transmitter
pub trait RadioTx {
    /// Send one frame to a peer
    ///
    /// Resolves once the send-complete callback has fired. `Err` means the
    /// stack refused the frame; `Ok(SendStatus::Failed)` means it went out
    /// but was not acknowledged.
    fn send(&mut self, destination: &HwAddr, data: &[u8]) -> impl core::future::Future<Output = Result<SendStatus, RadioError>>;
}

/// Radio receiver
pub trait RadioRx {
    /// Wait for the next frame and copy it into `buffer`
    fn receive(&mut self, buffer: &mut [u8]) -> impl core::future::Future<Output = Result<ReceivedFrame, RadioError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_descriptions() {
        assert_eq!(RadioError::NotInitialized.description(), "ESPNOW not Init.");
        assert_eq!(RadioError::PeerNotFound.description(), "Peer not found.");
        assert_eq!(RadioError::Other(0x3069).description(), "Not sure what happened");
    }

    #[test]
    fn test_debug_keeps_vendor_code() {
        // Send failures are logged with both forms
        assert_eq!(std::format!("{:?}", RadioError::Other(0x3069)), "Other(12393)");
        assert_eq!(std::format!("{:?}", RadioError::PeerNotFound), "PeerNotFound");
    }

    #[test]
    fn test_send_status_text() {
        assert_eq!(SendStatus::Delivered.as_str(), "Delivery Success");
        assert_eq!(SendStatus::Failed.as_str(), "Delivery Fail");
    }
}
