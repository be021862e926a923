//! Static module registry.
//!
//! Maps `(module code, version)` to a constructor. Discovery walks this table
//! in order, so its order fixes the order of the root's children.

use crate::components::{ModuleCtor, gpp, pbm, phy, port};
use crate::discovery::enumeration::ModuleCode;

/// One registry row.
#[derive(Clone, Copy, Debug)]
pub struct ModuleRegistryEntry {
    /// Module code to match.
    pub code: ModuleCode,
    /// Module version to match.
    pub version: u8,
    /// Constructor for matching table entries.
    pub build: ModuleCtor,
}

const fn entry(code: ModuleCode, version: u8, build: ModuleCtor) -> ModuleRegistryEntry {
    ModuleRegistryEntry { code, version, build }
}

/// Known modules in discovery order.
pub static MODULE_REGISTRY: &[ModuleRegistryEntry] = &[
    entry(ModuleCode::MAC, 0, port::build),
    entry(ModuleCode::MAC, 1, port::build),
    entry(ModuleCode::PBM, 0, pbm::build),
    entry(ModuleCode::GPP, 0, gpp::build),
    entry(ModuleCode::GPP, 1, gpp::build),
    entry(ModuleCode::IOM, 0, phy::build),
];

/// Returns `true` if some registry row handles `(code, version)`.
pub fn is_known(code: ModuleCode, version: u8) -> bool {
    MODULE_REGISTRY.iter().any(|r| r.code == code && r.version == version)
}
