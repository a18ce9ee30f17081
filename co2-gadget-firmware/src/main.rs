//! CO2 Gadget - ESP-NOW telemetry and preference firmware
//!
//! Main firmware binary for ESP32-based CO2 monitors. Loads the user
//! preferences from flash, brings up ESP-NOW towards the gateway, and runs
//! the publish, receive and calibration tasks.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use esp_radio::wifi::{ClientConfig, ModeConfig};
use static_cell::StaticCell;
use {esp_backtrace as _, esp_println as _};

use co2_gadget_core::link::LinkError;
use co2_gadget_core::storage::PreferenceStore;
use co2_gadget_hal_esp32::{Esp32FlashStorage, EspNowControl, EspNowRx, EspNowTx};

use crate::channels::LINK;
use crate::config::load_preferences;

mod channels;
mod config;
mod tasks;

esp_bootloader_esp_idf::esp_app_desc!();

// Heap for the Wi-Fi driver
const HEAP_SIZE: usize = 72 * 1024;

// Radio controller must outlive the ESP-NOW handles given to tasks
static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();

/// Main entry point
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    info!("CO2 Gadget firmware starting...");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);
    info!("Peripherals initialized");

    // User preferences
    let mut store = PreferenceStore::new(Esp32FlashStorage::new(peripherals.FLASH));
    let preferences = load_preferences(&mut store).await;

    // Radio: ESP-NOW rides on the Wi-Fi driver, which must be started
    let radio = match esp_radio::init() {
        Ok(radio) => RADIO.init(radio),
        Err(e) => {
            error!("-->[ESPN] Radio init failed: {:?}", Debug2Format(&e));
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let (mut wifi, interfaces) =
        match esp_radio::wifi::new(radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(e) => {
                error!("-->[ESPN] Wi-Fi init failed: {:?}", Debug2Format(&e));
                loop {
                    Timer::after_secs(1).await;
                }
            }
        };

    if let Err(e) = wifi.set_config(&ModeConfig::Client(ClientConfig::default())) {
        error!("-->[ESPN] Wi-Fi mode config failed: {:?}", Debug2Format(&e));
    }
    if let Err(e) = wifi.start_async().await {
        error!("-->[ESPN] Wi-Fi start failed: {:?}", Debug2Format(&e));
    }

    let (manager, sender, receiver) = interfaces.esp_now.split();
    let mut control = EspNowControl::new(manager);

    // Wi-Fi connection management lives elsewhere; use the configured channel
    let wifi_channel: Option<u8> = None;

    {
        let mut link = LINK.lock().await;
        match wifi_channel {
            Some(channel) => info!("-->[ESPN] Initializing ESP-NOW in already connected WiFi channel: {}", channel),
            None => info!("-->[ESPN] Initializing ESP-NOW in channel: {}", link.config().channel),
        }

        match link.init(&mut control, wifi_channel) {
            Ok(channel) => {
                info!("-->[ESPN] Added ESP-NOW peer: {}", link.config().peer);
                info!(
                    "-->[ESPN] ESP-NOW ready on channel {}, board {}, every {} s",
                    channel,
                    link.config().board_id,
                    link.config().publish_interval_s
                );
            }
            Err(LinkError::Disabled) => info!("-->[ESPN] ESP-NOW disabled"),
            Err(LinkError::Channel(e)) => {
                error!("-->[ESPN] Error initializing ESP-NOW: {=str}", e.description())
            }
            Err(LinkError::Peer(e)) => error!("-->[ESPN] Failed to add peer: {=str}", e.description()),
        }
    }

    // Spawn tasks
    match tasks::espnow_rx_task(EspNowRx::new(receiver)) {
        Ok(token) => spawner.spawn(token),
        Err(_) => error!("Failed to spawn ESP-NOW RX task"),
    }
    match tasks::espnow_tx_task(EspNowTx::new(sender)) {
        Ok(token) => spawner.spawn(token),
        Err(_) => error!("Failed to spawn ESP-NOW TX task"),
    }
    match tasks::calibration_task(store, preferences) {
        Ok(token) => spawner.spawn(token),
        Err(_) => error!("Failed to spawn calibration task"),
    }

    info!("All tasks spawned, firmware running");

    // Dropping the Wi-Fi controller would stop the radio
    let _wifi = wifi;

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
