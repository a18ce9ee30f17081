//! Inter-task shared state
//!
//! Everything more than one task touches lives here, behind embassy-sync
//! primitives.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use co2_gadget_core::link::EspNowLink;
use co2_gadget_core::readings::SensorReadings;

use crate::config::LINK_CONFIG;

/// ESP-NOW link state (publisher, receiver and setup share it)
pub static LINK: Mutex<CriticalSectionRawMutex, EspNowLink> = Mutex::new(EspNowLink::new(LINK_CONFIG));

/// Latest sensor readings (written by the sensor driver)
pub static READINGS: Mutex<CriticalSectionRawMutex, SensorReadings> = Mutex::new(SensorReadings::new());

/// Calibration requested over ESP-NOW, value in ppm
pub static CALIBRATION_REQUEST: Signal<CriticalSectionRawMutex, u16> = Signal::new();

/// Calibration value stored and waiting for the sensor driver, in ppm
pub static CALIBRATION_PENDING: Signal<CriticalSectionRawMutex, u16> = Signal::new();
