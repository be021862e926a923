//! GRW address encodings.
//!
//! A GRW carries one opaque 64-bit address whose meaning belongs to the bound
//! transport. This module provides:
//! 1. **`GrwAddress`:** The opaque value stored in every GRW.
//! 2. **`SmbusAddress`:** Device register, device address, line and sub-bus packed into one word.
//! 3. **`MdioAddress`:** Device index, MMD page and register packed into one word.
//!
//! Direct, ROM and cached-status transports use the raw value as a byte offset
//! or bit mask.

/// Transport-specific address held by a GRW.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrwAddress(pub u64);

impl GrwAddress {
    /// Returns the raw value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Interprets the address as a byte offset into the register window.
    #[inline(always)]
    pub const fn offset(self) -> u64 {
        self.0
    }
}

impl From<SmbusAddress> for GrwAddress {
    fn from(addr: SmbusAddress) -> Self {
        Self(u64::from(addr.pack()))
    }
}

impl From<MdioAddress> for GrwAddress {
    fn from(addr: MdioAddress) -> Self {
        Self(u64::from(addr.pack()))
    }
}

/// Location of one byte-wide register behind an SMBus controller.
///
/// Packed layout: `[7:0]` device register, `[15:8]` 7-bit device address,
/// `[23:16]` clock/data line index, `[31:24]` sub-bus index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SmbusAddress {
    /// Register inside the target device.
    pub device_register: u8,
    /// 7-bit bus address of the target device.
    pub device_address: u8,
    /// Clock/data line pair the device hangs off.
    pub line: u8,
    /// Controller instance on cards with several SMBus masters.
    pub sub_bus: u8,
}

impl SmbusAddress {
    /// Packs the fields into a 32-bit word.
    pub const fn pack(self) -> u32 {
        (self.device_register as u32)
            | (((self.device_address & 0x7F) as u32) << 8)
            | ((self.line as u32) << 16)
            | ((self.sub_bus as u32) << 24)
    }

    /// Unpacks a GRW address produced by [`SmbusAddress::pack`].
    pub const fn unpack(addr: GrwAddress) -> Self {
        let raw = addr.0 as u32;
        Self {
            device_register: (raw & 0xFF) as u8,
            device_address: ((raw >> 8) & 0x7F) as u8,
            line: ((raw >> 16) & 0xFF) as u8,
            sub_bus: ((raw >> 24) & 0xFF) as u8,
        }
    }
}

/// Location of one 16-bit register on an MDIO (clause 45) bus.
///
/// Packed layout: `[15:0]` register, `[20:16]` MMD page, `[25:21]` device index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MdioAddress {
    /// Port/PHY index on the bus (5 bits).
    pub device: u8,
    /// MDIO manageable device page (5 bits).
    pub mmd: u8,
    /// Register within the page.
    pub register: u16,
}

impl MdioAddress {
    /// Packs the fields into a 32-bit word.
    pub const fn pack(self) -> u32 {
        (self.register as u32) | (((self.mmd & 0x1F) as u32) << 16) | (((self.device & 0x1F) as u32) << 21)
    }

    /// Unpacks a GRW address produced by [`MdioAddress::pack`].
    pub const fn unpack(addr: GrwAddress) -> Self {
        let raw = addr.0 as u32;
        Self {
            device: ((raw >> 21) & 0x1F) as u8,
            mmd: ((raw >> 16) & 0x1F) as u8,
            register: (raw & 0xFFFF) as u16,
        }
    }
}
