//! Telemetry/command record encoding and decoding
//!
//! Record layout (36 bytes, little-endian):
//! - 0: message type (u8), 3 bytes padding
//! - 4: board id (i32)
//! - 8: temperature in °C (f32)
//! - 12: relative humidity in % (f32)
//! - 16: CO2 in ppm (u16), 2 bytes padding
//! - 20: battery voltage (f32)
//! - 24: reading id (i32)
//! - 28: command code (i32)
//! - 32: command parameter (u16), 2 bytes padding
//!
//! Padding is written as zero and ignored when decoding.

use crate::command::{Command, MessageType};

/// Size of an encoded record in bytes
pub const RECORD_SIZE: usize = 36;

const OFFSET_TYPE: usize = 0;
const OFFSET_BOARD_ID: usize = 4;
const OFFSET_TEMPERATURE: usize = 8;
const OFFSET_HUMIDITY: usize = 12;
const OFFSET_CO2: usize = 16;
const OFFSET_BATTERY: usize = 20;
const OFFSET_READING_ID: usize = 24;
const OFFSET_COMMAND: usize = 28;
const OFFSET_PARAMETER: usize = 32;

/// Errors that can occur during record encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Received frame is not exactly one record long
    LengthMismatch {
        /// Bytes received
        received: usize,
        /// Bytes expected ([`RECORD_SIZE`])
        expected: usize,
    },
    /// Type tag is not a known message type
    UnknownMessageType(u8),
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Telemetry record sent by the gadget, command record sent by the gateway
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryRecord {
    /// Record type tag
    pub message_type: MessageType,
    /// Board the record comes from (telemetry) or is addressed to (command)
    pub board_id: i32,
    /// Temperature in °C
    pub temperature: f32,
    /// Relative humidity in %
    pub humidity: f32,
    /// CO2 concentration in ppm
    pub co2: u16,
    /// Battery voltage in V
    pub battery: f32,
    /// Reading counter, incremented for every transmission
    pub reading_id: i32,
    /// Raw command code, see [`Command`]
    pub command: i32,
    /// Command parameter
    pub parameter: u16,
}

impl Default for TelemetryRecord {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TelemetryRecord {
    /// Create an empty CO2 Gadget record for a board
    pub const fn new(board_id: i32) -> Self {
        Self {
            message_type: MessageType::Co2Gadget,
            board_id,
            temperature: 0.0,
            humidity: 0.0,
            co2: 0,
            battery: 0.0,
            reading_id: 0,
            command: 0,
            parameter: 0,
        }
    }

    /// The command code as a known command
    pub fn command(&self) -> Option<Command> {
        Command::from_code(self.command)
    }

    /// Encode this record into a byte buffer
    ///
    /// Returns the number of bytes written (always [`RECORD_SIZE`])
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, RecordError> {
        if buffer.len() < RECORD_SIZE {
            return Err(RecordError::BufferTooSmall);
        }

        let buffer = &mut buffer[..RECORD_SIZE];
        buffer.fill(0);

        buffer[OFFSET_TYPE] = self.message_type.to_byte();
        put(buffer, OFFSET_BOARD_ID, self.board_id.to_le_bytes());
        put(buffer, OFFSET_TEMPERATURE, self.temperature.to_le_bytes());
        put(buffer, OFFSET_HUMIDITY, self.humidity.to_le_bytes());
        put(buffer, OFFSET_CO2, self.co2.to_le_bytes());
        put(buffer, OFFSET_BATTERY, self.battery.to_le_bytes());
        put(buffer, OFFSET_READING_ID, self.reading_id.to_le_bytes());
        put(buffer, OFFSET_COMMAND, self.command.to_le_bytes());
        put(buffer, OFFSET_PARAMETER, self.parameter.to_le_bytes());

        Ok(RECORD_SIZE)
    }

    /// Encode this record into a fixed-size array
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buffer = [0u8; RECORD_SIZE];
        // Cannot fail: the buffer is exactly one record
        let _ = self.encode(&mut buffer);
        buffer
    }

    /// Decode a record from a received frame
    ///
    /// The frame must be exactly [`RECORD_SIZE`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        if bytes.len() != RECORD_SIZE {
            return Err(RecordError::LengthMismatch {
                received: bytes.len(),
                expected: RECORD_SIZE,
            });
        }

        let message_type = MessageType::from_byte(bytes[OFFSET_TYPE])
            .ok_or(RecordError::UnknownMessageType(bytes[OFFSET_TYPE]))?;

        Ok(Self {
            message_type,
            board_id: i32::from_le_bytes(take(bytes, OFFSET_BOARD_ID)),
            temperature: f32::from_le_bytes(take(bytes, OFFSET_TEMPERATURE)),
            humidity: f32::from_le_bytes(take(bytes, OFFSET_HUMIDITY)),
            co2: u16::from_le_bytes(take(bytes, OFFSET_CO2)),
            battery: f32::from_le_bytes(take(bytes, OFFSET_BATTERY)),
            reading_id: i32::from_le_bytes(take(bytes, OFFSET_READING_ID)),
            command: i32::from_le_bytes(take(bytes, OFFSET_COMMAND)),
            parameter: u16::from_le_bytes(take(bytes, OFFSET_PARAMETER)),
        })
    }
}

fn put<const N: usize>(buffer: &mut [u8], offset: usize, bytes: [u8; N]) {
    buffer[offset..offset + N].copy_from_slice(&bytes);
}

fn take<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> TelemetryRecord {
        TelemetryRecord {
            message_type: MessageType::Co2Gadget,
            board_id: 1,
            temperature: 21.5,
            humidity: 48.25,
            co2: 612,
            battery: 4.12,
            reading_id: 7,
            command: Command::None.code(),
            parameter: 0,
        }
    }

    #[test]
    fn test_encode_layout() {
        let bytes = sample().to_bytes();

        assert_eq!(bytes[0], 2); // MSG_CO2GADGET
        assert_eq!(&bytes[1..4], &[0, 0, 0]); // padding
        assert_eq!(&bytes[4..8], &1i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &21.5f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &48.25f32.to_le_bytes());
        assert_eq!(&bytes[16..18], &612u16.to_le_bytes());
        assert_eq!(&bytes[18..20], &[0, 0]); // padding
        assert_eq!(&bytes[20..24], &4.12f32.to_le_bytes());
        assert_eq!(&bytes[24..28], &7i32.to_le_bytes());
        assert_eq!(&bytes[28..32], &0i32.to_le_bytes());
        assert_eq!(&bytes[32..34], &0u16.to_le_bytes());
        assert_eq!(&bytes[34..36], &[0, 0]); // padding
    }

    #[test]
    fn test_decode_gateway_calibration_command() {
        // Command frame as the gateway's C struct lays it out
        let mut frame = [0u8; RECORD_SIZE];
        frame[0] = 2;
        frame[4..8].copy_from_slice(&3i32.to_le_bytes());
        frame[28..32].copy_from_slice(&1i32.to_le_bytes());
        frame[32..34].copy_from_slice(&420u16.to_le_bytes());

        let record = TelemetryRecord::decode(&frame).unwrap();
        assert_eq!(record.board_id, 3);
        assert_eq!(record.command(), Some(Command::Calibration));
        assert_eq!(record.parameter, 420);
    }

    #[test]
    fn test_decode_ignores_padding() {
        let mut frame = sample().to_bytes();
        frame[1] = 0xAB;
        frame[19] = 0xCD;
        frame[35] = 0xEF;

        assert_eq!(TelemetryRecord::decode(&frame).unwrap(), sample());
    }

    #[test]
    fn test_decode_unknown_type() {
        let mut frame = sample().to_bytes();
        frame[0] = 0x42;

        assert_eq!(
            TelemetryRecord::decode(&frame),
            Err(RecordError::UnknownMessageType(0x42))
        );
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buffer = [0u8; RECORD_SIZE - 1];
        assert_eq!(sample().encode(&mut buffer), Err(RecordError::BufferTooSmall));
    }

    #[test]
    fn test_unknown_command_code_kept_raw() {
        let mut record = sample();
        record.command = 99;
        let decoded = TelemetryRecord::decode(&record.to_bytes()).unwrap();
        assert_eq!(decoded.command, 99);
        assert_eq!(decoded.command(), None);
    }

    proptest! {
        #[test]
        fn prop_wrong_length_rejected(len in 0usize..250) {
            prop_assume!(len != RECORD_SIZE);
            let frame = [2u8; 250];
            prop_assert_eq!(
                TelemetryRecord::decode(&frame[..len]),
                Err(RecordError::LengthMismatch { received: len, expected: RECORD_SIZE })
            );
        }

        #[test]
        fn prop_encode_decode(
            board_id in any::<i32>(),
            temperature in -40.0f32..85.0,
            humidity in 0.0f32..100.0,
            co2 in any::<u16>(),
            battery in 0.0f32..5.0,
            reading_id in any::<i32>(),
            command in any::<i32>(),
            parameter in any::<u16>(),
        ) {
            let record = TelemetryRecord {
                message_type: MessageType::Co2Gadget,
                board_id,
                temperature,
                humidity,
                co2,
                battery,
                reading_id,
                command,
                parameter,
            };
            prop_assert_eq!(TelemetryRecord::decode(&record.to_bytes()), Ok(record));
        }
    }
}
