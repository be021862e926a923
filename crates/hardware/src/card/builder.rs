//! Card construction.
//!
//! `CardBuilder` assembles everything a card needs before discovery runs:
//! 1. **Register window:** A caller-supplied `RegisterSpace`, or an anonymous
//!    mapping pre-loaded with an enumeration table for offline cards.
//! 2. **Timing:** The `Delay` primitive and `CardConfig` polling budgets.
//! 3. **Identity:** What the driver reported at open, plus the optional ROM image.
//!
//! `open` then builds the root, runs discovery and hands back a ready `Card`.

use tracing::{debug, info};

use crate::card::device::Card;
use crate::card::identity::{CardIdentity, MAX_STREAMS};
use crate::card::interconnect::Bus;
use crate::card::region::MappedRegion;
use crate::card::traits::{Delay, NoDelay, RegisterSpace, ThreadSleep};
use crate::common::{DagError, Result};
use crate::config::CardConfig;
use crate::discovery::{self, RegisterEntry, encode_table};
use crate::grw::RomImage;
use crate::model::{Component, ComponentCode, IdAllocator, Passive};

/// Builder for [`Card`].
pub struct CardBuilder {
    identity: CardIdentity,
    config: CardConfig,
    regs: Option<Box<dyn RegisterSpace>>,
    delay: Box<dyn Delay>,
    rom: Option<RomImage>,
    offline_table: Option<Vec<RegisterEntry>>,
}

impl CardBuilder {
    /// Starts a builder for a card with `identity`.
    pub fn new(identity: CardIdentity) -> Self {
        Self {
            identity,
            config: CardConfig::default(),
            regs: None,
            delay: Box::new(ThreadSleep),
            rom: None,
            offline_table: None,
        }
    }

    /// Replaces the default configuration.
    pub fn config(mut self, config: CardConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `regs` as the card's register window.
    pub fn registers(mut self, regs: impl RegisterSpace + 'static) -> Self {
        self.regs = Some(Box::new(regs));
        self
    }

    /// Replaces the sleep primitive used between polls.
    pub fn delay(mut self, delay: impl Delay + 'static) -> Self {
        self.delay = Box::new(delay);
        self
    }

    /// Attaches the card's ROM image.
    pub fn rom(mut self, rom: RomImage) -> Self {
        self.rom = Some(rom);
        self
    }

    /// Backs the card with an anonymous register window holding `table`.
    ///
    /// Offline cards never sleep between polls.
    pub fn offline(mut self, table: &[RegisterEntry]) -> Self {
        self.offline_table = Some(table.to_vec());
        self.delay = Box::new(NoDelay);
        self
    }

    fn offline_window(config: &CardConfig, table: &[RegisterEntry]) -> Result<MappedRegion> {
        let mut region = MappedRegion::anonymous(config.offline.register_window_size)?;
        let words = encode_table(table);
        let base = config.enum_table.base_offset;
        let end = (words.len() as u64)
            .checked_mul(4)
            .and_then(|len| base.checked_add(len))
            .filter(|end| *end <= region.size());
        if end.is_none() {
            return Err(DagError::InvalidParameter(format!(
                "enumeration table of {} entries at {base:#x} does not fit the offline window",
                table.len()
            )));
        }
        // In range: base + 4 * words.len() was checked above.
        let mut offset = base;
        for word in words {
            region.write_u32(offset, word);
            offset += 4;
        }
        Ok(region)
    }

    /// Builds the card and runs discovery.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if no register window was supplied (or both a window
    /// and an offline table were), the offline table does not fit, or the
    /// identity asks for more than [`MAX_STREAMS`] streams; otherwise the first
    /// discovery failure.
    pub fn open(self) -> Result<Card> {
        let streams = self.identity.stream_count();
        if streams > MAX_STREAMS {
            return Err(DagError::InvalidParameter(format!(
                "{streams} streams requested, at most {MAX_STREAMS} supported"
            )));
        }
        let regs: Box<dyn RegisterSpace> = match (self.regs, self.offline_table) {
            (Some(regs), None) => regs,
            (None, Some(table)) => Box::new(Self::offline_window(&self.config, &table)?),
            (None, None) => return Err(DagError::InvalidParameter("no register window supplied".into())),
            (Some(_), Some(_)) => {
                return Err(DagError::InvalidParameter(
                    "offline cards use their own register window".into(),
                ));
            }
        };

        let mut bus = Bus::new(regs, self.delay, self.config);
        if let Some(rom) = self.rom {
            bus = bus.with_rom(rom);
        }

        let mut ids = IdAllocator::new();
        let mut root = Component::new(ids.component(), ComponentCode::Root, 0, Passive);
        debug!(card = ids.card(), device_id = self.identity.device_id, "discovering");
        discovery::discover(&mut root, &mut bus, &mut ids, &self.identity)?;
        info!(
            card = ids.card(),
            device_id = format_args!("{:#06x}", self.identity.device_id),
            components = root.subtree_len(),
            "card opened"
        );
        Ok(Card::new(ids.card(), self.identity, bus, root))
    }
}

impl std::fmt::Debug for CardBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardBuilder")
            .field("identity", &self.identity)
            .field("config", &self.config)
            .field("registers", &self.regs.as_ref().map(|r| r.name().to_owned()))
            .field("rom", &self.rom.is_some())
            .field("offline_table", &self.offline_table)
            .finish_non_exhaustive()
    }
}
