//! # Unit Tests
//!
//! Grouped by layer, leaves first: configuration, register transports,
//! attributes, component wiring, discovery, firmware matching and the card API.

/// Attribute rules and reusable behaviors.
pub mod attributes;

/// Card API: id checks, lifecycle, inventory, firmware checks.
pub mod card;


/// Configuration defaults and loading.
pub mod config;

/// Module discovery and register base updates.
pub mod discovery;


/// GRW transports against simulated and mocked hardware.
pub mod transports;
