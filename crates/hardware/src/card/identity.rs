//! Card identification supplied by the device-open collaborator.

use serde::{Deserialize, Serialize};

/// Upper bound on stream components a card may carry.
pub const MAX_STREAMS: u32 = 256;

/// Coprocessor id; `-1` means none fitted (or "any" in catalog rows).
pub type CoproId = i32;

/// Where the board temperature sensor sits on the SMBus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SensorLocation {
    /// 7-bit device address.
    pub device_address: u8,
    /// Line within the controller.
    #[serde(default)]
    pub line: u8,
    /// Controller instance.
    #[serde(default)]
    pub sub_bus: u8,
}

/// What the driver reports about an opened card.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CardIdentity {
    /// PCI device id.
    pub device_id: u16,
    /// Board revision.
    #[serde(default)]
    pub board_rev: u32,
    /// Fitted coprocessor, `-1` if none.
    #[serde(default = "no_copro")]
    pub copro: CoproId,
    /// Receive stream count.
    #[serde(default)]
    pub rx_streams: u32,
    /// Transmit stream count.
    #[serde(default)]
    pub tx_streams: u32,
    /// Firmware image slot loaded at open.
    #[serde(default)]
    pub load_index: u32,
    /// Temperature sensor, if the board has one.
    #[serde(default)]
    pub sensor: Option<SensorLocation>,
}

const fn no_copro() -> CoproId {
    -1
}

impl CardIdentity {
    /// Creates an identity with no streams, coprocessor or sensor.
    pub const fn new(device_id: u16) -> Self {
        Self {
            device_id,
            board_rev: 0,
            copro: -1,
            rx_streams: 0,
            tx_streams: 0,
            load_index: 0,
            sensor: None,
        }
    }

    /// Number of stream components the card carries.
    ///
    /// Saturates at `u32::MAX`; `CardBuilder::open` rejects anything above
    /// [`MAX_STREAMS`].
    pub const fn stream_count(&self) -> u32 {
        let rx = self.rx_streams.saturating_mul(2);
        let tx = self.tx_streams.saturating_mul(2);
        if rx > tx { rx } else { tx }
    }
}
