//! ESP-NOW radio driver for ESP32
//!
//! Thin wrappers over the three halves of `esp_radio::esp_now` so the link
//! logic only sees the `co2-gadget-hal` radio traits. The Wi-Fi driver
//! must be started (station mode) before any frame goes out.

use co2_gadget_hal::{HwAddr, PeerConfig, RadioError, ReceivedFrame, SendStatus};
use esp_radio::esp_now::{
    EspNowError, EspNowManager, EspNowReceiver, EspNowSender, EspNowWifiInterface, PeerInfo,
};

/// Map an ESP-NOW stack error
fn map_error(error: EspNowError) -> RadioError {
    use esp_radio::esp_now::Error;

    match error {
        EspNowError::Error(Error::NotInitialized) => RadioError::NotInitialized,
        EspNowError::Error(Error::InvalidArgument) => RadioError::InvalidArgument,
        EspNowError::Error(Error::OutOfMemory) => RadioError::OutOfMemory,
        EspNowError::Error(Error::PeerListFull) => RadioError::PeerListFull,
        EspNowError::Error(Error::NotFound) => RadioError::PeerNotFound,
        EspNowError::Error(Error::InternalError) => RadioError::Internal,
        EspNowError::Error(Error::PeerExists) => RadioError::PeerExists,
        EspNowError::Error(Error::InterfaceMismatch) => RadioError::InvalidArgument,
        EspNowError::Error(Error::Other(code)) => RadioError::Other(code),
        // SendFailed is reported by the sender as a delivery failure
        _ => RadioError::Internal,
    }
}

/// Channel and peer table management
pub struct EspNowControl<'d> {
    manager: EspNowManager<'d>,
}

impl<'d> EspNowControl<'d> {
    /// Wrap the ESP-NOW manager
    pub fn new(manager: EspNowManager<'d>) -> Self {
        Self { manager }
    }
}

impl<'d> co2_gadget_hal::RadioControl for EspNowControl<'d> {
    fn set_channel(&mut self, channel: u8) -> Result<(), RadioError> {
        self.manager.set_channel(channel).map_err(map_error)
    }

    fn add_peer(&mut self, peer: &PeerConfig) -> Result<(), RadioError> {
        self.manager
            .add_peer(PeerInfo {
                interface: EspNowWifiInterface::Sta,
                peer_address: peer.address,
                lmk: None,
                channel: Some(peer.channel),
                encrypt: peer.encrypt,
            })
            .map_err(map_error)
    }

    fn remove_peer(&mut self, address: &HwAddr) -> Result<(), RadioError> {
        self.manager.remove_peer(address).map_err(map_error)
    }
}

/// ESP-NOW transmitter
pub struct EspNowTx<'d> {
    sender: EspNowSender<'d>,
}

impl<'d> EspNowTx<'d> {
    /// Wrap the ESP-NOW sender
    pub fn new(sender: EspNowSender<'d>) -> Self {
        Self { sender }
    }
}

impl<'d> co2_gadget_hal::RadioTx for EspNowTx<'d> {
    async fn send(&mut self, destination: &HwAddr, data: &[u8]) -> Result<SendStatus, RadioError> {
        match self.sender.send_async(destination, data).await {
            Ok(()) => Ok(SendStatus::Delivered),
            Err(EspNowError::SendFailed) => Ok(SendStatus::Failed),
            Err(e) => Err(map_error(e)),
        }
    }
}

/// ESP-NOW receiver
pub struct EspNowRx<'d> {
    receiver: EspNowReceiver<'d>,
}

impl<'d> EspNowRx<'d> {
    /// Wrap the ESP-NOW receiver
    pub fn new(receiver: EspNowReceiver<'d>) -> Self {
        Self { receiver }
    }
}

impl<'d> co2_gadget_hal::RadioRx for EspNowRx<'d> {
    async fn receive(&mut self, buffer: &mut [u8]) -> Result<ReceivedFrame, RadioError> {
        let received = self.receiver.receive_async().await;
        let data = received.data();

        let copied = data.len().min(buffer.len());
        buffer[..copied].copy_from_slice(&data[..copied]);

        Ok(ReceivedFrame {
            source: received.info.src_address,
            len: data.len(),
        })
    }
}
