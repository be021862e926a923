//! Runtime capability model for programmable network-capture cards.
//!
//! This crate discovers the function blocks present on a card and exposes them
//! as a tree of typed, introspectable objects:
//! 1. **GRW:** One read/write contract over direct, SMBus, MDIO, ROM and cached-status transports.
//! 2. **Model:** Components owning attributes, with per-kind behavior objects.
//! 3. **Discovery:** Builds the tree from the card's module enumeration table.
//! 4. **Firmware:** Grades candidate bitstreams against static image catalogs.
//! 5. **Card:** The public entry point tying the above to one device.
//!
//! # Examples
//!
//! ```
//! use dagcfg_core::card::{CardBuilder, CardIdentity};
//! use dagcfg_core::discovery::{ModuleCode, RegisterEntry};
//! use dagcfg_core::model::{AttributeCode, AttributeValue, ComponentCode};
//!
//! let mut identity = CardIdentity::new(0x4500);
//! identity.rx_streams = 1;
//! let table = [
//!     RegisterEntry::new(ModuleCode::MAC, 0, 0x0100),
//!     RegisterEntry::new(ModuleCode::PBM, 0, 0x1000),
//! ];
//! let mut card = CardBuilder::new(identity).offline(&table).open().unwrap();
//!
//! let port = card.find_component(ComponentCode::Port, 0).unwrap();
//! let active = card.attribute_of(port, AttributeCode::Active).unwrap();
//! card.set_attribute(active, &AttributeValue::Boolean(true)).unwrap();
//! assert_eq!(card.get_attribute(active).unwrap(), &AttributeValue::Boolean(true));
//! ```

/// Card root, builder and register plumbing.
pub mod card;
/// Shared types (addresses, sealed handles, errors).
pub mod common;
/// Per-kind component constructors.
pub mod components;
/// Card configuration (polling budgets, table layout).
pub mod config;
/// Module discovery from the enumeration table.
pub mod discovery;
/// Firmware image catalogs and matching.
pub mod firmware;
/// Generic register accessors and their transports.
pub mod grw;
/// Component/attribute object model.
pub mod model;

/// Card entry point; build one with [`CardBuilder`].
pub use crate::card::{Card, CardBuilder, CardIdentity};
/// Root configuration type; use `CardConfig::default()` or load from JSON.
pub use crate::config::CardConfig;
/// Crate error and result types.
pub use crate::common::{DagError, GrwError, Result};
