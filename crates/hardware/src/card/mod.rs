//! Card root and its register plumbing.
//!
//! This module groups what sits between the caller's device handle and the
//! component tree. It provides:
//! 1. **Traits:** `RegisterSpace` and `Delay`, the seams to the device.
//! 2. **Regions:** `MappedRegion`, a checked raw register mapping.
//! 3. **Bus:** The per-card transaction context shared by every GRW.
//! 4. **Card:** `CardBuilder` and `Card`, the public entry points.

/// Card builder.
pub mod builder;

/// The card object.
pub mod device;

/// Driver-reported identification.
pub mod identity;

/// Per-card register bus.
pub mod interconnect;

/// Raw register mappings.
pub mod region;

/// Transport traits.
pub mod traits;

pub use builder::CardBuilder;
pub use device::Card;
pub use identity::{CardIdentity, CoproId, MAX_STREAMS, SensorLocation};
