//! Register bus shared by every GRW on a card.
//!
//! This module bundles what a transport needs to run one transaction. It provides:
//! 1. **Window access:** Traced 32-bit reads and writes into the card's `RegisterSpace`.
//! 2. **Timing:** The `Delay` primitive and the polling budgets from `CardConfig`.
//! 3. **ROM:** The card's ROM image, when one was supplied, for ROM-backed GRWs.

use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::card::traits::{Delay, RegisterSpace};
use crate::config::CardConfig;
use crate::grw::rom::RomImage;

/// Transaction context handed to GRW backends.
pub struct Bus {
    regs: Box<dyn RegisterSpace>,
    delay: Box<dyn Delay>,
    config: CardConfig,
    rom: Option<RomImage>,
}

impl Bus {
    /// Creates a bus over a register window.
    ///
    /// # Arguments
    ///
    /// * `regs` - The card's register window.
    /// * `delay` - Sleep primitive for polling loops.
    /// * `config` - Polling budgets and layout parameters.
    pub fn new(regs: Box<dyn RegisterSpace>, delay: Box<dyn Delay>, config: CardConfig) -> Self {
        Self {
            regs,
            delay,
            config,
            rom: None,
        }
    }

    /// Attaches a ROM image for ROM-backed GRWs.
    pub fn with_rom(mut self, rom: RomImage) -> Self {
        self.rom = Some(rom);
        self
    }

    /// Reads the 32-bit register at `offset`.
    pub fn read_u32(&mut self, offset: u64) -> u32 {
        let val = self.regs.read_u32(offset);
        trace!(offset = format_args!("{offset:#06x}"), val = format_args!("{val:#010x}"), "reg read");
        val
    }

    /// Writes the 32-bit register at `offset`.
    pub fn write_u32(&mut self, offset: u64, val: u32) {
        trace!(offset = format_args!("{offset:#06x}"), val = format_args!("{val:#010x}"), "reg write");
        self.regs.write_u32(offset, val);
    }

    /// Sleeps for `duration` using the bus delay primitive.
    pub fn sleep(&self, duration: Duration) {
        self.delay.delay(duration);
    }

    /// Returns the card configuration.
    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    /// Returns the ROM image, if one is attached.
    pub fn rom(&self) -> Option<&RomImage> {
        self.rom.as_ref()
    }

    /// Returns the register window size in bytes.
    pub fn window_size(&self) -> u64 {
        self.regs.size()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("window", &self.regs.name())
            .field("size", &self.regs.size())
            .field("rom", &self.rom.is_some())
            .finish_non_exhaustive()
    }
}
