//! Message types and command codes

/// Record type tag shared by the gateway's message router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageType {
    /// JSON payload (other devices)
    Json,
    /// Reserved
    Reserved,
    /// CO2 Gadget telemetry/command record
    Co2Gadget,
    /// Pulse counter record (other devices)
    PulseCounter,
    /// Anything else
    Other,
}

// Wire format values
const TYPE_JSON: u8 = 0;
const TYPE_RESERVED: u8 = 1;
const TYPE_CO2_GADGET: u8 = 2;
const TYPE_PULSE_COUNTER: u8 = 3;
const TYPE_OTHER: u8 = 128;

impl MessageType {
    /// Parse a type from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            TYPE_JSON => Some(MessageType::Json),
            TYPE_RESERVED => Some(MessageType::Reserved),
            TYPE_CO2_GADGET => Some(MessageType::Co2Gadget),
            TYPE_PULSE_COUNTER => Some(MessageType::PulseCounter),
            TYPE_OTHER => Some(MessageType::Other),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            MessageType::Json => TYPE_JSON,
            MessageType::Reserved => TYPE_RESERVED,
            MessageType::Co2Gadget => TYPE_CO2_GADGET,
            MessageType::PulseCounter => TYPE_PULSE_COUNTER,
            MessageType::Other => TYPE_OTHER,
        }
    }
}

/// Commands a gateway can send to a gadget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// No command (plain telemetry)
    None,
    /// Force-calibrate the CO2 sensor to `parameter` ppm
    Calibration,
    /// Set the deep sleep period to `parameter` seconds
    DeepSleepPeriod,
    /// Link test
    Test,
}

const CMD_NONE: i32 = 0;
const CMD_CALIBRATION: i32 = 1;
const CMD_DEEP_SLEEP_PERIOD: i32 = 2;
const CMD_TEST: i32 = 10;

impl Command {
    /// Parse a command from its wire code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            CMD_NONE => Some(Command::None),
            CMD_CALIBRATION => Some(Command::Calibration),
            CMD_DEEP_SLEEP_PERIOD => Some(Command::DeepSleepPeriod),
            CMD_TEST => Some(Command::Test),
            _ => None,
        }
    }

    /// Convert to wire code
    pub fn code(self) -> i32 {
        match self {
            Command::None => CMD_NONE,
            Command::Calibration => CMD_CALIBRATION,
            Command::DeepSleepPeriod => CMD_DEEP_SLEEP_PERIOD,
            Command::Test => CMD_TEST,
        }
    }
}
