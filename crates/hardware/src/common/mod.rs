//! Common types shared by every layer of the capability model.
//!
//! This module provides:
//! 1. **Addresses:** Opaque GRW addresses and the SMBus/MDIO packings.
//! 2. **Handles:** Checksum-sealed values for the raw-pointer boundary.
//! 3. **Errors:** `DagError`, `GrwError` and `ConfigError`.

/// GRW address encodings.
pub mod addr;

/// Error types and the crate `Result` alias.
pub mod error;

/// Magic/checksum sealed handles.
pub mod handle;

pub use addr::{GrwAddress, MdioAddress, SmbusAddress};
pub use error::{ConfigError, DagError, GrwError, Result};
pub use handle::{Sealable, Sealed};
