//! Attributes: typed, named values on a component.
//!
//! An attribute pairs fixed metadata (code, class, declared type) with a
//! behavior object that knows how to produce and consume values. The behavior
//! usually drives a bound [`Grw`], but may derive values from cached state or
//! hold constants.
//!
//! Rules enforced here, not in behaviors:
//! * Writes to status attributes fail with `StatusAttribute` before anything else.
//! * Values whose type differs from the declared type fail with `InvalidParameter`.
//! * Text conversion is optional; a behavior that declines reports "not serializable".

use std::fmt;

use serde::Serialize;

use crate::card::interconnect::Bus;
use crate::common::{DagError, GrwError, Result};
use crate::grw::Grw;
use crate::model::codes::{AttributeClass, AttributeCode};
use crate::model::ids::{AttributeId, ComponentId};
use crate::model::value::{AttributeValue, ValueType};

/// Register context handed to an attribute behavior.
#[derive(Debug)]
pub struct AttributeIo<'a> {
    bus: &'a mut Bus,
    grw: Option<&'a mut Grw>,
}

impl<'a> AttributeIo<'a> {
    /// Bundles the bus with the attribute's GRW, if any.
    pub fn new(bus: &'a mut Bus, grw: Option<&'a mut Grw>) -> Self {
        Self { bus, grw }
    }

    /// Returns the register bus.
    pub fn bus(&mut self) -> &mut Bus {
        self.bus
    }

    fn parts(&mut self) -> Result<(&mut Bus, &mut Grw)> {
        let grw = self
            .grw
            .as_deref_mut()
            .ok_or_else(|| DagError::General("attribute has no register bound".into()))?;
        Ok((&mut *self.bus, grw))
    }

    /// Reads the bound register.
    ///
    /// # Errors
    ///
    /// Returns `General` if no GRW is bound. Transport failures are not errors
    /// here; they are latched in the GRW.
    pub fn read(&mut self) -> Result<u32> {
        let (bus, grw) = self.parts()?;
        Ok(grw.read(bus))
    }

    /// Writes the bound register.
    ///
    /// # Errors
    ///
    /// Returns `General` if no GRW is bound.
    pub fn write(&mut self, val: u32) -> Result<()> {
        let (bus, grw) = self.parts()?;
        grw.write(bus, val);
        Ok(())
    }

    /// Reads masked bits under the GRW's on-operation policy.
    ///
    /// # Errors
    ///
    /// Returns `General` if no GRW is bound.
    pub fn read_bit(&mut self, mask: u32) -> Result<bool> {
        let (bus, grw) = self.parts()?;
        Ok(grw.read_bit(bus, mask))
    }

    /// Writes masked bits under the GRW's on-operation policy.
    ///
    /// # Errors
    ///
    /// Returns `General` if no GRW is bound.
    pub fn write_bit(&mut self, mask: u32, on: bool) -> Result<()> {
        let (bus, grw) = self.parts()?;
        grw.write_bit(bus, mask, on);
        Ok(())
    }

    /// Reads a masked field shifted down to bit 0.
    ///
    /// # Errors
    ///
    /// Returns `General` if no GRW is bound.
    pub fn read_field(&mut self, mask: u32) -> Result<u32> {
        let (bus, grw) = self.parts()?;
        Ok(grw.read_field(bus, mask))
    }

    /// Writes a masked field.
    ///
    /// # Errors
    ///
    /// Returns `General` if no GRW is bound.
    pub fn write_field(&mut self, mask: u32, value: u32) -> Result<()> {
        let (bus, grw) = self.parts()?;
        grw.write_field(bus, mask, value);
        Ok(())
    }
}

/// Per-attribute behavior.
///
/// Only `get` is required. The defaults make an attribute read-only, with no
/// post-initialization work and no text form.
pub trait AttributeBehavior: Send + fmt::Debug {
    /// Produces the current value.
    fn get(&mut self, io: &mut AttributeIo<'_>) -> Result<AttributeValue>;

    /// Consumes a value already checked against the declared type.
    fn set(&mut self, _io: &mut AttributeIo<'_>, _value: &AttributeValue) -> Result<()> {
        Err(DagError::Unimplemented)
    }

    /// Runs once after the component tree is built.
    fn post_initialize(&mut self, _io: &mut AttributeIo<'_>) -> Result<()> {
        Ok(())
    }

    /// Renders the current value as text; `None` if not serializable.
    fn to_text(&mut self, _io: &mut AttributeIo<'_>) -> Option<Result<String>> {
        None
    }

    /// Parses and applies `text`; `None` if not serializable.
    fn from_text(&mut self, _io: &mut AttributeIo<'_>, _text: &str) -> Option<Result<()>> {
        None
    }

    /// Releases behavior resources.
    fn dispose(&mut self) {}
}

/// A typed, named value on a component.
#[derive(Debug)]
pub struct Attribute {
    id: AttributeId,
    owner: ComponentId,
    code: AttributeCode,
    name: String,
    description: String,
    class: AttributeClass,
    value_type: ValueType,
    grw: Option<Grw>,
    behavior: Box<dyn AttributeBehavior>,
    scratch: AttributeValue,
}

/// Serializable description of an attribute.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeSummary {
    /// Attribute id.
    pub id: AttributeId,
    /// Attribute kind.
    pub code: AttributeCode,
    /// Attribute name.
    pub name: String,
    /// Attribute description.
    pub description: String,
    /// Config or status.
    pub class: AttributeClass,
    /// Declared value type.
    pub value_type: ValueType,
}

impl Attribute {
    /// Creates an attribute with the code's default name and description.
    pub fn new(
        id: AttributeId,
        owner: ComponentId,
        code: AttributeCode,
        class: AttributeClass,
        value_type: ValueType,
        behavior: impl AttributeBehavior + 'static,
    ) -> Self {
        Self {
            id,
            owner,
            code,
            name: code.name().to_owned(),
            description: code.description().to_owned(),
            class,
            value_type,
            grw: None,
            behavior: Box::new(behavior),
            scratch: AttributeValue::Null,
        }
    }

    /// Binds a register and records this attribute in its back-reference.
    pub fn with_grw(mut self, mut grw: Grw) -> Self {
        let _ = grw.bind_attribute(self.id);
        self.grw = Some(grw);
        self
    }

    /// Returns the attribute id.
    pub fn id(&self) -> AttributeId {
        self.id
    }

    /// Returns the owning component.
    pub fn owner(&self) -> ComponentId {
        self.owner
    }

    /// Returns the attribute kind.
    pub fn code(&self) -> AttributeCode {
        self.code
    }

    /// Returns the attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attribute description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the config/status classification.
    pub fn class(&self) -> AttributeClass {
        self.class
    }

    /// Returns the declared value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns the bound register, if any.
    pub fn grw(&self) -> Option<&Grw> {
        self.grw.as_ref()
    }

    pub(crate) fn grw_mut(&mut self) -> Option<&mut Grw> {
        self.grw.as_mut()
    }

    /// Returns and clears the bound register's latched error.
    ///
    /// Lets callers tell a transport timeout from a genuine zero reading.
    pub fn grw_last_error(&mut self) -> Option<GrwError> {
        self.grw.as_mut().and_then(Grw::take_last_error)
    }

    fn split<'a>(&'a mut self, bus: &'a mut Bus) -> (&'a mut dyn AttributeBehavior, AttributeIo<'a>) {
        (self.behavior.as_mut(), AttributeIo::new(bus, self.grw.as_mut()))
    }

    /// Reads the value into the scratch slot and returns it.
    ///
    /// The reference stays valid until the next call that borrows the attribute.
    ///
    /// # Errors
    ///
    /// Propagates behavior errors. `InvalidParameter` if the behavior produced
    /// a value of another type; `Null` is always accepted.
    pub fn get_value(&mut self, bus: &mut Bus) -> Result<&AttributeValue> {
        let (behavior, mut io) = self.split(bus);
        let value = behavior.get(&mut io)?;
        if value != AttributeValue::Null && value.value_type() != self.value_type {
            return Err(DagError::InvalidParameter(format!(
                "attribute {} produced {:?}, declared {:?}",
                self.name,
                value.value_type(),
                self.value_type
            )));
        }
        self.scratch = value;
        Ok(&self.scratch)
    }

    /// Applies a value.
    ///
    /// # Errors
    ///
    /// `StatusAttribute` for status attributes, `InvalidParameter` for a
    /// mismatched value type, otherwise whatever the behavior reports.
    pub fn set_value(&mut self, bus: &mut Bus, value: &AttributeValue) -> Result<()> {
        if self.class == AttributeClass::Status {
            return Err(DagError::StatusAttribute);
        }
        if value.value_type() != self.value_type {
            return Err(DagError::InvalidParameter(format!(
                "{} expects {:?}, got {:?}",
                self.name,
                self.value_type,
                value.value_type()
            )));
        }
        let (behavior, mut io) = self.split(bus);
        behavior.set(&mut io, value)
    }

    /// Renders the value as text; `Ok(None)` if the attribute has no text form.
    ///
    /// # Errors
    ///
    /// Propagates behavior errors.
    pub fn to_text(&mut self, bus: &mut Bus) -> Result<Option<String>> {
        let (behavior, mut io) = self.split(bus);
        behavior.to_text(&mut io).transpose()
    }

    /// Parses and applies `text`; `Ok(false)` if the attribute has no text form.
    ///
    /// # Errors
    ///
    /// `StatusAttribute` for status attributes, otherwise parse or behavior errors.
    pub fn from_text(&mut self, bus: &mut Bus, text: &str) -> Result<bool> {
        if self.class == AttributeClass::Status {
            return Err(DagError::StatusAttribute);
        }
        let (behavior, mut io) = self.split(bus);
        match behavior.from_text(&mut io, text) {
            Some(r) => r.map(|()| true),
            None => Ok(false),
        }
    }

    pub(crate) fn post_initialize(&mut self, bus: &mut Bus) -> Result<()> {
        let (behavior, mut io) = self.split(bus);
        behavior.post_initialize(&mut io)
    }

    /// Returns a serializable description.
    pub fn summary(&self) -> AttributeSummary {
        AttributeSummary {
            id: self.id,
            code: self.code,
            name: self.name.clone(),
            description: self.description.clone(),
            class: self.class,
            value_type: self.value_type,
        }
    }

    pub(crate) fn dispose(&mut self) {
        self.behavior.dispose();
        if let Some(grw) = self.grw.as_mut() {
            grw.dispose();
        }
        self.scratch = AttributeValue::Null;
    }
}
