//! Component/attribute object model.
//!
//! This module provides:
//! 1. **Ids:** `ComponentId` and `AttributeId`, stamped with the owning card's serial.
//! 2. **Values:** `AttributeValue` and its `ValueType` tag.
//! 3. **Attributes:** Typed values with per-instance behavior and an optional GRW.
//! 4. **Components:** Tree nodes with lifecycle hooks, owning attributes and children.

/// Attributes and the attribute behavior trait.
pub mod attribute;

/// Reusable attribute behaviors.
pub mod behaviors;

/// Component and attribute kind tags.
pub mod codes;

/// Components and the component behavior trait.
pub mod component;

/// Typed ids and their allocator.
pub mod ids;

/// Attribute values.
pub mod value;

pub use attribute::{Attribute, AttributeBehavior, AttributeIo, AttributeSummary};
pub use behaviors::{Constant, LatchSample, LatchedBit, RegisterBit, RegisterField, RegisterWord};
pub use codes::{AttributeClass, AttributeCode, ComponentCode};
pub use component::{Component, ComponentBehavior, ComponentContext, ComponentSummary, ModuleSlot, Passive, PostInit};
pub use ids::{AttributeId, ComponentId, IdAllocator};
pub use value::{AttributeValue, ValueType};
