//! Latest sensor readings

/// Snapshot of the values the gadget publishes
///
/// Written by the sensor driver, copied into the outgoing record on
/// every publication.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReadings {
    /// CO2 concentration in ppm
    pub co2_ppm: u16,
    /// Temperature in °C
    pub temperature_c: f32,
    /// Relative humidity in %
    pub humidity_pct: f32,
    /// Battery voltage in V
    pub battery_voltage: f32,
}

impl SensorReadings {
    /// All-zero readings (nothing measured yet)
    pub const fn new() -> Self {
        Self {
            co2_ppm: 0,
            temperature_c: 0.0,
            humidity_pct: 0.0,
            battery_voltage: 0.0,
        }
    }
}
