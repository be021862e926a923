//! Register enumeration table.
//!
//! The card reports its function blocks as a table of little-endian 32-bit
//! words in the register window, starting at `enum_table.base_offset`:
//!
//! * `[15:0]`: Register base address of the block.
//! * `[23:16]`: Module code.
//! * `[27:24]`: Flags.
//! * `[31:28]`: Module version.
//!
//! The table ends at the first word whose module code is
//! [`ModuleCode::TERMINATOR`], or after `enum_table.max_entries` words.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::card::interconnect::Bus;

/// Module code reported in the enumeration table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleCode(pub u8);

impl ModuleCode {
    /// SMBus controller block (version 0 raw, version 1 DRB).
    pub const SMBUS: Self = Self(0x05);
    /// Network port MAC.
    pub const MAC: Self = Self(0x10);
    /// Packet buffer manager.
    pub const PBM: Self = Self(0x20);
    /// Packet processor.
    pub const GPP: Self = Self(0x30);
    /// I/O module with a tunnelled PHY MDIO bus.
    pub const IOM: Self = Self(0x40);
    /// Table terminator.
    pub const TERMINATOR: Self = Self(0xFF);
}

impl fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// One row of the enumeration table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RegisterEntry {
    /// Module code.
    pub module: ModuleCode,
    /// Module version.
    pub version: u8,
    /// Register base address within the window.
    pub base: u64,
    /// Module flags.
    pub flags: u8,
}

impl RegisterEntry {
    /// Creates an entry with no flags.
    pub const fn new(module: ModuleCode, version: u8, base: u16) -> Self {
        Self {
            module,
            version,
            base: base as u64,
            flags: 0,
        }
    }

    /// Decodes one table word.
    pub const fn from_word(word: u32) -> Self {
        Self {
            module: ModuleCode(((word >> 16) & 0xFF) as u8),
            version: ((word >> 28) & 0xF) as u8,
            base: (word & 0xFFFF) as u64,
            flags: ((word >> 24) & 0xF) as u8,
        }
    }

    /// Encodes the entry as a table word.
    ///
    /// The base is truncated to 16 bits, version and flags to 4 bits.
    pub const fn to_word(&self) -> u32 {
        (self.base as u32 & 0xFFFF)
            | ((self.module.0 as u32) << 16)
            | (((self.flags & 0xF) as u32) << 24)
            | (((self.version & 0xF) as u32) << 28)
    }
}

/// Word that terminates a table.
pub const TERMINATOR_WORD: u32 = (ModuleCode::TERMINATOR.0 as u32) << 16;

/// Encodes `entries` followed by a terminator word.
pub fn encode_table(entries: &[RegisterEntry]) -> Vec<u32> {
    entries
        .iter()
        .map(RegisterEntry::to_word)
        .chain(std::iter::once(TERMINATOR_WORD))
        .collect()
}

/// Reads the enumeration table from the card.
///
/// Stops at the terminator, at `max_entries`, or at the end of the window.
pub fn read_table(bus: &mut Bus) -> Vec<RegisterEntry> {
    let base = bus.config().enum_table.base_offset;
    let max = bus.config().enum_table.max_entries;
    let window = bus.window_size();
    let mut entries = Vec::new();
    for i in 0..max {
        let offset = (i as u64)
            .checked_mul(4)
            .and_then(|o| base.checked_add(o))
            .filter(|o| o.checked_add(4).is_some_and(|end| end <= window));
        let Some(offset) = offset else {
            warn!(base, entry = i, window, "enumeration table runs past the register window");
            return entries;
        };
        let entry = RegisterEntry::from_word(bus.read_u32(offset));
        if entry.module == ModuleCode::TERMINATOR {
            debug!(entries = entries.len(), "enumeration table read");
            return entries;
        }
        entries.push(entry);
    }
    warn!(max, "enumeration table has no terminator within the entry limit");
    entries
}
