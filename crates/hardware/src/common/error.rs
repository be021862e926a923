//! Error types for the capability model.
//!
//! This module defines the closed set of failures returned by public operations. It provides:
//! 1. **`DagError`:** Card-level failures (bad references, status writes, firmware mismatch).
//! 2. **`GrwError`:** Transport failures latched in a GRW's last-error field.
//! 3. **`ConfigError`:** Configuration file loading and parsing failures.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, DagError>;

/// Errors returned by card, component and attribute operations.
///
/// Every public entry point validates its references before touching state, so
/// any of these errors implies that nothing was mutated.
#[derive(Debug, Error)]
pub enum DagError {
    /// The id does not belong to the card it was presented to.
    #[error("reference does not belong to this card")]
    InvalidCardRef,

    /// An argument was out of range or of the wrong value type.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No component with the requested id, code or index exists.
    #[error("no such component")]
    NoSuchComponent,

    /// No attribute with the requested id or code exists.
    #[error("no such attribute")]
    NoSuchAttribute,

    /// Attempted to write a status (read-only) attribute.
    #[error("attribute is a status attribute and cannot be written")]
    StatusAttribute,

    /// The firmware image does not match this board.
    #[error("firmware image failed verification")]
    FirmwareVerifyFailed,

    /// The card has no firmware image index for the requested load slot.
    #[error("card is not supported")]
    CardNotSupported,

    /// The operation is not bound for this attribute or component.
    #[error("operation not implemented")]
    Unimplemented,

    /// Catch-all failure with a description.
    #[error("{0}")]
    General(String),

    /// A firmware image file could not be read.
    #[error("cannot read image {path}: {source}")]
    Image {
        /// Image file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A register transaction failed.
    #[error(transparent)]
    Grw(#[from] GrwError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Transport failure recorded by a GRW.
///
/// Timeouts are non-fatal: the access still returns a best-effort value and
/// callers poll the GRW's last error to tell a timeout from a genuine zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GrwError {
    /// A read did not complete or the device reported an error.
    #[error("register read failed")]
    ReadError,

    /// A write did not complete or the device reported an error.
    #[error("register write failed")]
    WriteError,
}

/// Failures loading a [`CardConfig`](crate::config::CardConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// File that failed to open or read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid JSON for the schema.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
