//! ESP-NOW link configuration

use co2_gadget_protocol::MacAddress;

/// Gateway the gadget reports to unless configured otherwise
pub const DEFAULT_PEER: MacAddress = MacAddress::new([0xE8, 0x68, 0xE7, 0x0F, 0x08, 0x90]);

/// Radio channel used when Wi-Fi is not connected
pub const DEFAULT_CHANNEL: u8 = 1;

/// Seconds between telemetry publications
pub const DEFAULT_PUBLISH_INTERVAL_S: u32 = 60;

/// Highest 2.4 GHz channel number
pub const MAX_CHANNEL: u8 = 14;

/// ESP-NOW link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Link enabled
    pub enabled: bool,
    /// This board's identifier; commands for other boards are ignored
    pub board_id: i32,
    /// Gateway address, or [`MacAddress::BROADCAST`]
    pub peer: MacAddress,
    /// Channel used when Wi-Fi is not connected (1-14)
    pub channel: u8,
    /// Seconds between publications
    pub publish_interval_s: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkConfig {
    /// Disabled link with the default gateway, channel and interval
    pub const fn new() -> Self {
        Self {
            enabled: false,
            board_id: 0,
            peer: DEFAULT_PEER,
            channel: DEFAULT_CHANNEL,
            publish_interval_s: DEFAULT_PUBLISH_INTERVAL_S,
        }
    }

    /// Publication interval in milliseconds
    pub const fn publish_interval_ms(&self) -> u64 {
        self.publish_interval_s as u64 * 1000
    }
}
