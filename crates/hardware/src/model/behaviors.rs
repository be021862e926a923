//! Reusable attribute behaviors.
//!
//! Most attributes on real hardware are a bit, a field or a whole word of one
//! register. These behaviors cover those cases over the attribute's GRW so
//! component constructors only pick a mask.

use crate::common::{DagError, Result};
use crate::grw::StatusLatch;
use crate::model::attribute::{AttributeBehavior, AttributeIo};
use crate::model::value::{AttributeValue, ValueType};

fn mismatch(expected: ValueType, got: &AttributeValue) -> DagError {
    DagError::InvalidParameter(format!("expected {expected:?}, got {:?}", got.value_type()))
}

/// One masked bit, read and written under the GRW's on-operation policy.
#[derive(Clone, Copy, Debug)]
pub struct RegisterBit {
    mask: u32,
}

impl RegisterBit {
    /// Creates a behavior over the bits in `mask`.
    pub const fn new(mask: u32) -> Self {
        Self { mask }
    }
}

impl AttributeBehavior for RegisterBit {
    fn get(&mut self, io: &mut AttributeIo<'_>) -> Result<AttributeValue> {
        Ok(AttributeValue::Boolean(io.read_bit(self.mask)?))
    }

    fn set(&mut self, io: &mut AttributeIo<'_>, value: &AttributeValue) -> Result<()> {
        let on = value.as_bool().ok_or_else(|| mismatch(ValueType::Boolean, value))?;
        io.write_bit(self.mask, on)
    }

    fn to_text(&mut self, io: &mut AttributeIo<'_>) -> Option<Result<String>> {
        Some(self.get(io).map(|v| v.to_string()))
    }

    fn from_text(&mut self, io: &mut AttributeIo<'_>, text: &str) -> Option<Result<()>> {
        Some(ValueType::Boolean.parse(text).and_then(|v| self.set(io, &v)))
    }
}

/// A masked multi-bit field, shifted down to bit 0.
#[derive(Clone, Copy, Debug)]
pub struct RegisterField {
    mask: u32,
}

impl RegisterField {
    /// Creates a behavior over the field selected by `mask`.
    pub const fn new(mask: u32) -> Self {
        Self { mask }
    }

    fn max(&self) -> u32 {
        if self.mask == 0 {
            0
        } else {
            self.mask >> self.mask.trailing_zeros()
        }
    }
}

impl AttributeBehavior for RegisterField {
    fn get(&mut self, io: &mut AttributeIo<'_>) -> Result<AttributeValue> {
        Ok(AttributeValue::Uint32(io.read_field(self.mask)?))
    }

    fn set(&mut self, io: &mut AttributeIo<'_>, value: &AttributeValue) -> Result<()> {
        let v = value.as_u32().ok_or_else(|| mismatch(ValueType::Uint32, value))?;
        if v > self.max() {
            return Err(DagError::InvalidParameter(format!(
                "{v} does not fit field {:#010x}",
                self.mask
            )));
        }
        io.write_field(self.mask, v)
    }

    fn to_text(&mut self, io: &mut AttributeIo<'_>) -> Option<Result<String>> {
        Some(self.get(io).map(|v| v.to_string()))
    }

    fn from_text(&mut self, io: &mut AttributeIo<'_>, text: &str) -> Option<Result<()>> {
        Some(ValueType::Uint32.parse(text).and_then(|v| self.set(io, &v)))
    }
}

/// The whole 32-bit register.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegisterWord;

impl AttributeBehavior for RegisterWord {
    fn get(&mut self, io: &mut AttributeIo<'_>) -> Result<AttributeValue> {
        Ok(AttributeValue::Uint32(io.read()?))
    }

    fn set(&mut self, io: &mut AttributeIo<'_>, value: &AttributeValue) -> Result<()> {
        let v = value.as_u32().ok_or_else(|| mismatch(ValueType::Uint32, value))?;
        io.write(v)
    }

    fn to_text(&mut self, io: &mut AttributeIo<'_>) -> Option<Result<String>> {
        Some(self.get(io).map(|v| format!("{:#010x}", v.as_u32().unwrap_or_default())))
    }

    fn from_text(&mut self, io: &mut AttributeIo<'_>, text: &str) -> Option<Result<()>> {
        Some(ValueType::Uint32.parse(text).and_then(|v| self.set(io, &v)))
    }
}

/// One bit of a component's latched status word.
///
/// Reads go through the attribute's GRW, normally a `CachedStatus` over the
/// component's latch, so no transaction is issued.
#[derive(Clone, Copy, Debug)]
pub struct LatchedBit {
    mask: u32,
}

impl LatchedBit {
    /// Creates a behavior over the bits in `mask`.
    pub const fn new(mask: u32) -> Self {
        Self { mask }
    }
}

impl AttributeBehavior for LatchedBit {
    fn get(&mut self, io: &mut AttributeIo<'_>) -> Result<AttributeValue> {
        Ok(AttributeValue::Boolean(io.read_bit(self.mask)?))
    }

    fn to_text(&mut self, io: &mut AttributeIo<'_>) -> Option<Result<String>> {
        Some(self.get(io).map(|v| v.to_string()))
    }
}

/// Samples the bound register into a status latch.
///
/// Reading this attribute refreshes the latch that `LatchedBit` attributes
/// on the same component read from.
#[derive(Clone, Debug)]
pub struct LatchSample {
    latch: StatusLatch,
}

impl LatchSample {
    /// Creates a sampler feeding `latch`.
    pub fn new(latch: StatusLatch) -> Self {
        Self { latch }
    }
}

impl AttributeBehavior for LatchSample {
    fn get(&mut self, io: &mut AttributeIo<'_>) -> Result<AttributeValue> {
        let word = io.read()?;
        self.latch.store(word);
        Ok(AttributeValue::Uint32(word))
    }

    fn post_initialize(&mut self, io: &mut AttributeIo<'_>) -> Result<()> {
        self.latch.store(io.read()?);
        Ok(())
    }
}

/// A fixed value captured at construction.
#[derive(Clone, Debug)]
pub struct Constant {
    value: AttributeValue,
}

impl Constant {
    /// Creates a behavior that always yields `value`.
    pub fn new(value: AttributeValue) -> Self {
        Self { value }
    }
}

impl AttributeBehavior for Constant {
    fn get(&mut self, _io: &mut AttributeIo<'_>) -> Result<AttributeValue> {
        Ok(self.value.clone())
    }

    fn to_text(&mut self, _io: &mut AttributeIo<'_>) -> Option<Result<String>> {
        Some(Ok(self.value.to_string()))
    }
}
