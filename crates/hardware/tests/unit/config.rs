//! # Configuration Tests
//!
//! Defaults, partial JSON overrides, and file loading.

use std::io::Write;
use std::time::Duration;

use dagcfg_core::common::ConfigError;
use dagcfg_core::config::CardConfig;
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let config = CardConfig::default();
    assert_eq!(config.smbus.retries, 200);
    assert_eq!(config.smbus.poll_delay(), Duration::from_micros(100));
    assert_eq!(config.mdio.settle(), Duration::from_micros(100));
    assert_eq!(config.mdio.data_valid_attempts, 4);
    assert_eq!(config.enum_table.base_offset, 0);
    assert_eq!(config.enum_table.max_entries, 128);
    assert_eq!(config.offline.register_window_size, 64 * 1024);
    assert_eq!(config.rom.trailer_v0, 32);
    assert_eq!(config.rom.trailer_v1, 64);
}

#[test]
fn empty_object_is_default() {
    assert_eq!(CardConfig::from_json_str("{}").unwrap(), CardConfig::default());
}

#[test]
fn partial_override_keeps_other_defaults() {
    let json = r#"{ "mdio": { "settle_us": 5 }, "enum_table": { "base_offset": 256 } }"#;
    let config = CardConfig::from_json_str(json).unwrap();
    assert_eq!(config.mdio.settle_us, 5);
    assert_eq!(config.mdio.data_valid_attempts, 4);
    assert_eq!(config.enum_table.base_offset, 256);
    assert_eq!(config.enum_table.max_entries, 128);
    assert_eq!(config.smbus, CardConfig::default().smbus);
}

#[test]
fn invalid_json_is_a_parse_error() {
    let err = CardConfig::from_json_str(r#"{ "smbus": { "retries": "many" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "smbus": {{ "retries": 7, "poll_delay_us": 0 }} }}"#).unwrap();
    let config = CardConfig::from_file(file.path()).unwrap();
    assert_eq!(config.smbus.retries, 7);
    assert_eq!(config.smbus.poll_delay(), Duration::ZERO);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match CardConfig::from_file(&path).unwrap_err() {
        ConfigError::Io { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other}"),
    }
}
