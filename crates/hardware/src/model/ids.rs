//! Typed object ids.
//!
//! Components and attributes are owned by their card's tree; callers refer to
//! them through ids that carry the owning card's serial. Presenting an id to a
//! different card is detected as `InvalidCardRef` instead of silently hitting
//! an unrelated object.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;

static NEXT_CARD_SERIAL: AtomicU32 = AtomicU32::new(1);

/// Id of a component within one card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId {
    card: u32,
    seq: u32,
}

/// Id of an attribute within one card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AttributeId {
    card: u32,
    seq: u32,
}

impl ComponentId {
    /// Builds an id from a card serial and sequence number.
    pub const fn from_parts(card: u32, seq: u32) -> Self {
        Self { card, seq }
    }

    /// Returns the serial of the owning card.
    pub const fn card(self) -> u32 {
        self.card
    }
}

impl AttributeId {
    /// Builds an id from a card serial and sequence number.
    pub const fn from_parts(card: u32, seq: u32) -> Self {
        Self { card, seq }
    }

    /// Returns the serial of the owning card.
    pub const fn card(self) -> u32 {
        self.card
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}.{}", self.card, self.seq)
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}.{}", self.card, self.seq)
    }
}

/// Hands out ids for one card.
#[derive(Debug)]
pub struct IdAllocator {
    card: u32,
    next: u32,
}

impl IdAllocator {
    /// Creates an allocator under a fresh, process-unique card serial.
    pub fn new() -> Self {
        Self {
            card: NEXT_CARD_SERIAL.fetch_add(1, Ordering::Relaxed),
            next: 0,
        }
    }

    /// Returns the card serial stamped into every id.
    pub fn card(&self) -> u32 {
        self.card
    }

    fn bump(&mut self) -> u32 {
        let seq = self.next;
        self.next += 1;
        seq
    }

    /// Allocates a component id.
    pub fn component(&mut self) -> ComponentId {
        ComponentId::from_parts(self.card, self.bump())
    }

    /// Allocates an attribute id.
    pub fn attribute(&mut self) -> AttributeId {
        AttributeId::from_parts(self.card, self.bump())
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
