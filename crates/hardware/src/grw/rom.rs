//! ROM trailer reads.
//!
//! Card ROM images end in a fixed-size trailer holding identification words.
//! Its layout depends on the ROM format version:
//! 1. **Version 0:** `rom.trailer_v0` bytes, no marker; payload starts at the trailer start.
//! 2. **Version 1+:** `rom.trailer_v1` bytes, starting with [`ROM_TRAILER_MAGIC`]
//!    (little-endian); payload starts after the marker.
//!
//! The GRW address is a byte offset into the payload; the value is the
//! little-endian word found there. ROM GRWs are read-only.

use crate::card::interconnect::Bus;
use crate::common::{GrwAddress, GrwError};
use crate::grw::RegisterAccess;

/// Marker opening a version 1+ trailer.
pub const ROM_TRAILER_MAGIC: u32 = 0x5AA5_C33C;

/// A card ROM image as read by the ROM programming collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RomImage {
    bytes: Vec<u8>,
    format_version: u8,
}

impl RomImage {
    /// Wraps ROM contents with the format version recorded alongside them.
    pub fn new(bytes: Vec<u8>, format_version: u8) -> Self {
        Self {
            bytes,
            format_version,
        }
    }

    /// Locates the trailer payload for this image's format.
    fn payload(&self, trailer_v0: usize, trailer_v1: usize) -> Option<&[u8]> {
        let size = if self.format_version == 0 { trailer_v0 } else { trailer_v1 };
        let start = self.bytes.len().checked_sub(size)?;
        let trailer = &self.bytes[start..];
        if self.format_version == 0 {
            return Some(trailer);
        }
        let marker = u32::from_le_bytes(trailer.get(..4)?.try_into().ok()?);
        (marker == ROM_TRAILER_MAGIC).then(|| &trailer[4..])
    }

    /// Reads the little-endian word at `offset` in the trailer payload.
    pub fn trailer_word(&self, trailer_v0: usize, trailer_v1: usize, offset: usize) -> Option<u32> {
        let payload = self.payload(trailer_v0, trailer_v1)?;
        let end = offset.checked_add(4)?;
        let word = payload.get(offset..end)?;
        Some(u32::from_le_bytes(word.try_into().ok()?))
    }
}

/// Reads words from the card ROM trailer.
#[derive(Clone, Copy, Debug, Default)]
pub struct RomRead;

impl RegisterAccess for RomRead {
    fn read(&mut self, bus: &mut Bus, addr: GrwAddress) -> Result<u32, GrwError> {
        let rom = bus.rom().ok_or(GrwError::ReadError)?;
        let cfg = &bus.config().rom;
        let offset = usize::try_from(addr.offset()).map_err(|_| GrwError::ReadError)?;
        rom.trailer_word(cfg.trailer_v0, cfg.trailer_v1, offset)
            .ok_or(GrwError::ReadError)
    }

    fn write(&mut self, _bus: &mut Bus, _addr: GrwAddress, _val: u32) -> Result<(), GrwError> {
        Err(GrwError::WriteError)
    }
}
