//! Module discovery.
//!
//! Builds a card's component tree from the enumeration table. It provides:
//! 1. **Table access:** Decoding and encoding of enumeration words (`enumeration`).
//! 2. **Registry:** The static `(module code, version)` → constructor map (`registry`).
//! 3. **Discovery:** `discover`, which populates the root in registry order.
//! 4. **Rebasing:** `update_register_base`, which re-resolves register bases after a firmware reload.
//!
//! # Discovery order
//!
//! 1. Card info, then the sensor if the card reports one.
//! 2. For each registry row in order, every table entry with that row's code
//!    and version, numbered by a running index per module code (versions share
//!    one count).
//! 3. After a packet buffer manager, one stream per capture stream,
//!    `max(2 * rx, 2 * tx)` in total.
//! 4. Post-initialization over the whole tree.

/// Enumeration table format.
pub mod enumeration;

/// Module registry.
pub mod registry;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::card::identity::CardIdentity;
use crate::card::interconnect::Bus;
use crate::common::Result;
use crate::components::{BuildContext, card_info, sensor, stream};
use crate::model::{Component, IdAllocator};

pub use enumeration::{ModuleCode, RegisterEntry, encode_table, read_table};
pub use registry::{MODULE_REGISTRY, ModuleRegistryEntry};

/// Populates `root` from the card's enumeration table and post-initializes the tree.
///
/// # Errors
///
/// Propagates the first post-initialization failure.
pub fn discover(root: &mut Component, bus: &mut Bus, ids: &mut IdAllocator, identity: &CardIdentity) -> Result<()> {
    let table = read_table(bus);
    for e in &table {
        if !registry::is_known(e.module, e.version) && e.module != ModuleCode::SMBUS {
            warn!(module = %e.module, version = e.version, "no constructor for module");
        }
    }
    populate(root, ids, identity, &table);
    debug!(components = root.subtree_len(), "discovery complete");
    root.post_initialize(bus)
}

/// Appends the components for `table` to `root` without touching hardware.
pub fn populate(root: &mut Component, ids: &mut IdAllocator, identity: &CardIdentity, table: &[RegisterEntry]) {
    let mut ctx = BuildContext { ids, identity, table };

    let _ = root.push_child(card_info::build(&mut ctx));
    if let Some(location) = identity.sensor {
        let _ = root.push_child(sensor::build(&mut ctx, location));
    }

    let mut next_index: HashMap<ModuleCode, u32> = HashMap::new();
    for row in MODULE_REGISTRY {
        for entry in table.iter().filter(|e| e.module == row.code && e.version == row.version) {
            let slot = next_index.entry(row.code).or_default();
            let index = *slot;
            *slot += 1;

            let component = (row.build)(&mut ctx, *entry, index);
            debug!(name = component.name(), base = entry.base, version = entry.version, "module found");
            let _ = root.push_child(component);

            if row.code == ModuleCode::PBM && index == 0 {
                for number in 0..identity.stream_count() {
                    let _ = root.push_child(stream::build(&mut ctx, *entry, index, number));
                }
            }
        }
    }
}

/// Re-resolves the register base of each of the root's children.
///
/// Children are matched to `table` by module code and per-code instance index.
/// A child whose module is no longer listed keeps its old base.
///
/// # Errors
///
/// Propagates the first component failure.
pub fn update_register_base(root: &mut Component, bus: &mut Bus, table: &[RegisterEntry]) -> Result<()> {
    let mut by_slot: HashMap<(ModuleCode, u32), RegisterEntry> = HashMap::new();
    let mut next_index: HashMap<ModuleCode, u32> = HashMap::new();
    for row in MODULE_REGISTRY {
        for entry in table.iter().filter(|e| e.module == row.code && e.version == row.version) {
            let slot = next_index.entry(row.code).or_default();
            let _ = by_slot.insert((row.code, *slot), *entry);
            *slot += 1;
        }
    }

    for child in root.children_mut() {
        let Some(slot) = child.module() else { continue };
        match by_slot.get(&(slot.entry.module, slot.index)) {
            Some(entry) => {
                if entry.base != slot.entry.base {
                    debug!(name = child.name(), from = slot.entry.base, to = entry.base, "register base moved");
                }
                child.update_register_base(bus, *entry)?;
            }
            None => warn!(name = child.name(), module = %slot.entry.module, "module missing after reload"),
        }
    }
    Ok(())
}
