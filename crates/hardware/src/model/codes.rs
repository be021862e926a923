//! Kind tags for components and attributes.

use std::fmt;

use serde::Serialize;

/// Kind of a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCode {
    /// Tree root.
    Root,
    /// Card identification block.
    CardInfo,
    /// Board temperature sensor.
    Sensor,
    /// Network port (MAC).
    Port,
    /// Packet buffer manager.
    PacketBufferManager,
    /// Capture or transmit stream.
    Stream,
    /// Packet processor (snap/variable length control).
    PacketProcessor,
    /// External PHY.
    Phy,
}

impl ComponentCode {
    /// Returns the default component name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::CardInfo => "card_info",
            Self::Sensor => "sensor",
            Self::Port => "port",
            Self::PacketBufferManager => "pbm",
            Self::Stream => "stream",
            Self::PacketProcessor => "gpp",
            Self::Phy => "phy",
        }
    }

    /// Returns the default component description.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Root => "Card root",
            Self::CardInfo => "Card identification",
            Self::Sensor => "Board temperature sensor",
            Self::Port => "Network port",
            Self::PacketBufferManager => "Packet buffer manager",
            Self::Stream => "Memory stream",
            Self::PacketProcessor => "Packet processor",
            Self::Phy => "External PHY",
        }
    }
}

impl fmt::Display for ComponentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether an attribute can be written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeClass {
    /// Writable configuration.
    Config,
    /// Read-only status.
    Status,
}

macro_rules! attribute_codes {
    ($($variant:ident => $name:literal, $desc:literal;)*) => {
        /// Kind of an attribute.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum AttributeCode {
            $(
                #[doc = $desc]
                $variant,
            )*
        }

        impl AttributeCode {
            /// Returns the default attribute name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Returns the default attribute description.
            pub const fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $desc,)*
                }
            }
        }
    };
}

attribute_codes! {
    PciDeviceId => "pci_device_id", "PCI device id of the card.";
    BoardRevision => "board_revision", "Hardware board revision.";
    SerialNumber => "serial_number", "Serial number from the ROM trailer.";
    CoprocessorType => "coprocessor_type", "Fitted coprocessor id, -1 when absent.";
    FirmwareLoadIndex => "firmware_load_index", "Firmware image slot loaded at open.";
    RxStreamCount => "rx_stream_count", "Number of receive streams.";
    TxStreamCount => "tx_stream_count", "Number of transmit streams.";
    Temperature => "temperature", "Board temperature in degrees Celsius.";
    TemperatureLimit => "temperature_limit", "Over-temperature alarm threshold.";
    Active => "active", "Port enabled.";
    Nic => "nic", "Auto-negotiation (NIC mode) enabled.";
    Loopback => "loopback", "MAC loopback enabled.";
    StatusSnapshot => "status_snapshot", "Samples the port status word into the link cache.";
    Link => "link", "Link up, from the latched status.";
    LocalFault => "local_fault", "Local fault, from the latched status.";
    RemoteFault => "remote_fault", "Remote fault, from the latched status.";
    PhyIdentifier => "phy_identifier", "PHY identifier register.";
    PhyReset => "phy_reset", "PHY soft reset.";
    PhyLink => "phy_link", "PHY reports link.";
    PhyLoopback => "phy_loopback", "PHY PCS loopback.";
    Drop => "drop", "Drop packets when the buffer is full.";
    BufferSize => "buffer_size", "Host buffer size in MiB.";
    StreamNumber => "stream_number", "Stream index within the card.";
    Direction => "direction", "Stream direction (rx or tx).";
    MemoryMegabytes => "memory_megabytes", "Memory allotted to the stream in MiB.";
    DropCount => "drop_count", "Packets dropped by the stream.";
    SnapLength => "snap_length", "Bytes captured per packet.";
    VariableLength => "variable_length", "Variable-length capture records.";
    Align64 => "align64", "Align records to 64 bytes.";
}

impl fmt::Display for AttributeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
