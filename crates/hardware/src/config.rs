//! Card configuration.
//!
//! This module defines the parameters that shape register transports and
//! discovery. It provides:
//! 1. **Defaults:** Baseline polling budgets, delays and table layout constants.
//! 2. **Structures:** Per-concern config sections (SMBus, MDIO, enumeration table, offline window, ROM).
//! 3. **Loading:** JSON from a string or file via `serde_json`.
//!
//! Every field has a default so a config file only needs the values it overrides.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::common::ConfigError;

/// Default configuration constants.
mod defaults {
    /// SMBus ready-bit polls before a transaction is declared failed.
    pub const SMBUS_RETRIES: u32 = 200;

    /// Delay between SMBus ready-bit polls in microseconds.
    pub const SMBUS_POLL_DELAY_US: u64 = 100;

    /// Delay between pushing an MDIO address word and the data phase, in microseconds.
    pub const MDIO_SETTLE_US: u64 = 100;

    /// Data-valid polls for an MDIO read before giving up.
    pub const MDIO_DATA_VALID_ATTEMPTS: u32 = 4;

    /// Byte offset of the module enumeration table in the register window.
    pub const ENUM_TABLE_BASE: u64 = 0x0000;

    /// Upper bound on enumeration table words read before the terminator.
    pub const ENUM_TABLE_MAX_ENTRIES: usize = 128;

    /// Size of the anonymous register window backing an offline card (64 KiB).
    pub const REGISTER_WINDOW_SIZE: usize = 64 * 1024;

    /// ROM trailer size for format version 0 images.
    pub const ROM_TRAILER_V0: usize = 32;

    /// ROM trailer size for format version 1 and later images.
    pub const ROM_TRAILER_V1: usize = 64;
}

/// Root configuration for one card.
///
/// # Examples
///
/// ```
/// use dagcfg_core::config::CardConfig;
///
/// let json = r#"{ "smbus": { "retries": 10 } }"#;
/// let config = CardConfig::from_json_str(json).unwrap();
/// assert_eq!(config.smbus.retries, 10);
/// assert_eq!(config.mdio.data_valid_attempts, 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CardConfig {
    /// SMBus transaction polling.
    #[serde(default)]
    pub smbus: SmbusConfig,

    /// MDIO transaction timing.
    #[serde(default)]
    pub mdio: MdioConfig,

    /// Enumeration table location.
    #[serde(default)]
    pub enum_table: EnumTableConfig,

    /// Offline card backing store.
    #[serde(default)]
    pub offline: OfflineConfig,

    /// ROM trailer layout.
    #[serde(default)]
    pub rom: RomConfig,
}

impl CardConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

/// SMBus busy-wait budget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SmbusConfig {
    /// Ready-bit polls per transaction.
    #[serde(default = "SmbusConfig::default_retries")]
    pub retries: u32,

    /// Delay between polls in microseconds.
    #[serde(default = "SmbusConfig::default_poll_delay_us")]
    pub poll_delay_us: u64,
}

impl SmbusConfig {
    fn default_retries() -> u32 {
        defaults::SMBUS_RETRIES
    }

    fn default_poll_delay_us() -> u64 {
        defaults::SMBUS_POLL_DELAY_US
    }

    /// Returns the poll delay as a `Duration`.
    pub fn poll_delay(&self) -> Duration {
        Duration::from_micros(self.poll_delay_us)
    }
}

impl Default for SmbusConfig {
    fn default() -> Self {
        Self {
            retries: defaults::SMBUS_RETRIES,
            poll_delay_us: defaults::SMBUS_POLL_DELAY_US,
        }
    }
}

/// MDIO transaction timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MdioConfig {
    /// Sleep between the address phase and the data phase, in microseconds.
    #[serde(default = "MdioConfig::default_settle_us")]
    pub settle_us: u64,

    /// Data-valid polls for a read.
    #[serde(default = "MdioConfig::default_data_valid_attempts")]
    pub data_valid_attempts: u32,
}

impl MdioConfig {
    fn default_settle_us() -> u64 {
        defaults::MDIO_SETTLE_US
    }

    fn default_data_valid_attempts() -> u32 {
        defaults::MDIO_DATA_VALID_ATTEMPTS
    }

    /// Returns the settle delay as a `Duration`.
    pub fn settle(&self) -> Duration {
        Duration::from_micros(self.settle_us)
    }
}

impl Default for MdioConfig {
    fn default() -> Self {
        Self {
            settle_us: defaults::MDIO_SETTLE_US,
            data_valid_attempts: defaults::MDIO_DATA_VALID_ATTEMPTS,
        }
    }
}

/// Where the module enumeration table lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnumTableConfig {
    /// Byte offset of the first table word.
    #[serde(default = "EnumTableConfig::default_base_offset")]
    pub base_offset: u64,

    /// Maximum words read before giving up on a terminator.
    #[serde(default = "EnumTableConfig::default_max_entries")]
    pub max_entries: usize,
}

impl EnumTableConfig {
    fn default_base_offset() -> u64 {
        defaults::ENUM_TABLE_BASE
    }

    fn default_max_entries() -> usize {
        defaults::ENUM_TABLE_MAX_ENTRIES
    }
}

impl Default for EnumTableConfig {
    fn default() -> Self {
        Self {
            base_offset: defaults::ENUM_TABLE_BASE,
            max_entries: defaults::ENUM_TABLE_MAX_ENTRIES,
        }
    }
}

/// Backing store for cards instantiated without hardware.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OfflineConfig {
    /// Size in bytes of the anonymous register window.
    #[serde(default = "OfflineConfig::default_register_window_size")]
    pub register_window_size: usize,
}

impl OfflineConfig {
    fn default_register_window_size() -> usize {
        defaults::REGISTER_WINDOW_SIZE
    }
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            register_window_size: defaults::REGISTER_WINDOW_SIZE,
        }
    }
}

/// ROM trailer sizes by format version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RomConfig {
    /// Trailer size for format version 0.
    #[serde(default = "RomConfig::default_trailer_v0")]
    pub trailer_v0: usize,

    /// Trailer size for format version 1 and later.
    #[serde(default = "RomConfig::default_trailer_v1")]
    pub trailer_v1: usize,
}

impl RomConfig {
    fn default_trailer_v0() -> usize {
        defaults::ROM_TRAILER_V0
    }

    fn default_trailer_v1() -> usize {
        defaults::ROM_TRAILER_V1
    }
}

impl Default for RomConfig {
    fn default() -> Self {
        Self {
            trailer_v0: defaults::ROM_TRAILER_V0,
            trailer_v1: defaults::ROM_TRAILER_V1,
        }
    }
}
