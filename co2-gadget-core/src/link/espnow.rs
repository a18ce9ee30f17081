//! ESP-NOW link state
//!
//! [`EspNowLink`] is the state behind the radio: configuration, the last
//! record sent and received, the publish timer and the calibration latch.
//! It never touches the radio data path itself. The firmware asks it for a
//! [`Publication`] and sends the payload, and hands it every received
//! frame through [`EspNowLink::handle_received`].

use co2_gadget_hal::{HwAddr, PeerConfig, RadioControl, RadioError};
use co2_gadget_protocol::{Command, MacAddress, RecordError, TelemetryRecord, RECORD_SIZE};

use crate::config::LinkConfig;
use crate::readings::SensorReadings;

/// Link setup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Link is disabled in the configuration
    Disabled,
    /// Radio refused the channel
    Channel(RadioError),
    /// Peer could not be added or removed
    Peer(RadioError),
}

/// A record ready to be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Publication {
    /// Gateway address
    pub destination: MacAddress,
    /// Reading counter carried in the payload
    pub reading_id: i32,
    /// Encoded record
    pub payload: [u8; RECORD_SIZE],
}

/// What happened to a received frame
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveOutcome {
    /// Record for this board, stored as the incoming record
    Accepted(TelemetryRecord),
    /// Calibration command for this board; the value is latched
    CalibrationRequested {
        /// Target CO2 concentration in ppm
        value: u16,
    },
    /// Well-formed record for a different board
    OtherBoard {
        /// Board the record was addressed to
        board_id: i32,
    },
    /// Frame could not be decoded
    Discarded(RecordError),
}

/// ESP-NOW link state
pub struct EspNowLink {
    config: LinkConfig,
    channel: Option<u8>,
    // Channel the gateway peer is registered on
    peer_channel: Option<u8>,
    outgoing: TelemetryRecord,
    incoming: TelemetryRecord,
    last_publish_ms: u64,
    pending_calibration: Option<u16>,
}

impl EspNowLink {
    /// Create a link that is not yet initialized
    pub const fn new(config: LinkConfig) -> Self {
        Self {
            config,
            channel: None,
            peer_channel: None,
            outgoing: TelemetryRecord::new(config.board_id),
            incoming: TelemetryRecord::new(0),
            last_publish_ms: 0,
            pending_calibration: None,
        }
    }

    /// Bring the link up
    ///
    /// Uses the Wi-Fi channel when Wi-Fi is connected, the configured
    /// channel otherwise. Returns the channel in use.
    pub fn init<R: RadioControl>(&mut self, radio: &mut R, wifi_channel: Option<u8>) -> Result<u8, LinkError> {
        self.channel = None;

        if !self.config.enabled {
            return Err(LinkError::Disabled);
        }

        let channel = wifi_channel.unwrap_or(self.config.channel);
        radio.set_channel(channel).map_err(LinkError::Channel)?;

        if self.peer_channel != Some(channel) {
            self.register_peer(radio, channel)?;
        }

        self.channel = Some(channel);
        Ok(channel)
    }

    /// Register the gateway on `channel`
    ///
    /// A peer left on another channel, by an earlier init or by someone
    /// else, is removed and added again.
    fn register_peer<R: RadioControl>(&mut self, radio: &mut R, channel: u8) -> Result<(), LinkError> {
        let peer = PeerConfig {
            address: self.config.peer.octets(),
            channel,
            encrypt: false,
        };

        if self.peer_channel.take().is_some() {
            remove_peer(radio, &peer.address)?;
        }

        match radio.add_peer(&peer) {
            Ok(()) => {}
            Err(RadioError::PeerExists) => {
                remove_peer(radio, &peer.address)?;
                radio.add_peer(&peer).map_err(LinkError::Peer)?;
            }
            Err(e) => return Err(LinkError::Peer(e)),
        }

        self.peer_channel = Some(channel);
        Ok(())
    }

    /// Take the link down
    ///
    /// The link is disabled even if removing the peer fails; that error is
    /// returned afterwards.
    pub fn disable<R: RadioControl>(&mut self, radio: &mut R) -> Result<(), LinkError> {
        self.config.enabled = false;
        self.channel = None;

        match self.peer_channel.take() {
            Some(_) => remove_peer(radio, &self.config.peer.octets()),
            None => Ok(()),
        }
    }

    /// Allow the link to come up again
    ///
    /// Only flips the configuration; [`EspNowLink::init`] brings the link up.
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Build the next publication if one is due
    ///
    /// Due means the link is ready and a full interval has passed since the
    /// last publication (or since boot). The publish time is stamped here,
    /// so a failed send waits a full interval like a successful one.
    pub fn prepare_publication(&mut self, now_ms: u64, readings: &SensorReadings) -> Option<Publication> {
        if !self.is_ready() {
            return None;
        }
        if now_ms.saturating_sub(self.last_publish_ms) < self.config.publish_interval_ms() {
            return None;
        }

        self.outgoing.board_id = self.config.board_id;
        self.outgoing.co2 = readings.co2_ppm;
        self.outgoing.temperature = readings.temperature_c;
        self.outgoing.humidity = readings.humidity_pct;
        self.outgoing.battery = readings.battery_voltage;
        self.outgoing.reading_id = self.outgoing.reading_id.wrapping_add(1);
        self.last_publish_ms = now_ms;

        Some(Publication {
            destination: self.config.peer,
            reading_id: self.outgoing.reading_id,
            payload: self.outgoing.to_bytes(),
        })
    }

    /// Process a received frame
    ///
    /// Only a well-formed record for this board replaces the incoming
    /// record. Any sender is accepted.
    pub fn handle_received(&mut self, _source: MacAddress, data: &[u8]) -> ReceiveOutcome {
        let record = match TelemetryRecord::decode(data) {
            Ok(record) => record,
            Err(e) => return ReceiveOutcome::Discarded(e),
        };

        if record.board_id != self.config.board_id {
            return ReceiveOutcome::OtherBoard {
                board_id: record.board_id,
            };
        }

        self.incoming = record;

        if record.command() == Some(Command::Calibration) {
            self.pending_calibration = Some(record.parameter);
            return ReceiveOutcome::CalibrationRequested {
                value: record.parameter,
            };
        }

        ReceiveOutcome::Accepted(record)
    }

    /// Consume the pending calibration request
    pub fn take_pending_calibration(&mut self) -> Option<u16> {
        self.pending_calibration.take()
    }

    /// Last record published (or to be published)
    pub fn outgoing(&self) -> &TelemetryRecord {
        &self.outgoing
    }

    /// Last record accepted for this board
    pub fn incoming(&self) -> &TelemetryRecord {
        &self.incoming
    }

    /// Channel in use, if the link is up
    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Link initialized and enabled
    pub fn is_ready(&self) -> bool {
        self.channel.is_some()
    }

    /// Link configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

/// Remove a peer, treating an already missing one as removed
fn remove_peer<R: RadioControl>(radio: &mut R, address: &HwAddr) -> Result<(), LinkError> {
    match radio.remove_peer(address) {
        Ok(()) | Err(RadioError::PeerNotFound) => Ok(()),
        Err(e) => Err(LinkError::Peer(e)),
    }
}
