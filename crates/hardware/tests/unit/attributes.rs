//! # Attribute Tests
//!
//! Classification and type checks, text conversion, and the reusable
//! register behaviors.

use dagcfg_core::common::{DagError, GrwAddress, GrwError, Result};
use dagcfg_core::config::CardConfig;
use dagcfg_core::grw::{Direct, Grw, OnOperation, StatusLatch};
use dagcfg_core::model::{
    Attribute, AttributeBehavior, AttributeClass, AttributeCode, AttributeId, AttributeIo, AttributeValue,
    ComponentId, Constant, LatchSample, RegisterBit, RegisterField, RegisterWord, ValueType,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::fixtures::scratch_bus;

const REG: u64 = 0x40;

fn attribute(
    seq: u32,
    class: AttributeClass,
    value_type: ValueType,
    behavior: impl AttributeBehavior + 'static,
) -> Attribute {
    Attribute::new(
        AttributeId::from_parts(9, seq),
        ComponentId::from_parts(9, 0),
        AttributeCode::Active,
        class,
        value_type,
        behavior,
    )
}

fn direct() -> Grw {
    Grw::new(GrwAddress(REG), Direct)
}

#[derive(Debug)]
struct Opaque;

impl AttributeBehavior for Opaque {
    fn get(&mut self, _io: &mut AttributeIo<'_>) -> Result<AttributeValue> {
        Ok(AttributeValue::Struct(vec![1, 2, 3]))
    }

    fn set(&mut self, _io: &mut AttributeIo<'_>, _value: &AttributeValue) -> Result<()> {
        Ok(())
    }
}

#[test]
fn status_attribute_rejects_writes_without_touching_register() {
    let mut bus = scratch_bus(CardConfig::default());
    bus.write_u32(REG, 0xA5);
    let mut attr = attribute(1, AttributeClass::Status, ValueType::Uint32, RegisterWord).with_grw(direct());

    assert!(matches!(
        attr.set_value(&mut bus, &AttributeValue::Uint32(7)),
        Err(DagError::StatusAttribute)
    ));
    assert!(matches!(attr.from_text(&mut bus, "7"), Err(DagError::StatusAttribute)));
    assert_eq!(bus.read_u32(REG), 0xA5);
    assert_eq!(attr.get_value(&mut bus).unwrap(), &AttributeValue::Uint32(0xA5));
}

#[test]
fn mismatched_value_type_is_rejected_first() {
    let mut bus = scratch_bus(CardConfig::default());
    let mut attr = attribute(2, AttributeClass::Config, ValueType::Boolean, RegisterBit::new(1)).with_grw(direct());
    assert!(matches!(
        attr.set_value(&mut bus, &AttributeValue::Uint32(1)),
        Err(DagError::InvalidParameter(_))
    ));
    assert_eq!(bus.read_u32(REG), 0);
}

#[test]
fn register_bit_uses_read_modify_write() {
    let mut bus = scratch_bus(CardConfig::default());
    bus.write_u32(REG, 0xF0);
    let mut attr = attribute(3, AttributeClass::Config, ValueType::Boolean, RegisterBit::new(1 << 1)).with_grw(direct());

    attr.set_value(&mut bus, &AttributeValue::Boolean(true)).unwrap();
    assert_eq!(bus.read_u32(REG), 0xF2);
    assert_eq!(attr.to_text(&mut bus).unwrap().as_deref(), Some("on"));
    assert!(attr.from_text(&mut bus, "off").unwrap());
    assert_eq!(bus.read_u32(REG), 0xF0);
}

#[test]
fn register_bit_honors_active_low_policy() {
    let mut bus = scratch_bus(CardConfig::default());
    bus.write_u32(REG, 0xFF);
    let grw = direct().with_on_operation(OnOperation::ClearBit);
    let mut attr = attribute(4, AttributeClass::Config, ValueType::Boolean, RegisterBit::new(1)).with_grw(grw);
    assert_eq!(attr.get_value(&mut bus).unwrap(), &AttributeValue::Boolean(false));
    attr.set_value(&mut bus, &AttributeValue::Boolean(true)).unwrap();
    assert_eq!(bus.read_u32(REG), 0xFE);
}

#[test]
fn register_field_rejects_values_wider_than_mask() {
    let mut bus = scratch_bus(CardConfig::default());
    let mut attr =
        attribute(5, AttributeClass::Config, ValueType::Uint32, RegisterField::new(0x0F00)).with_grw(direct());
    attr.set_value(&mut bus, &AttributeValue::Uint32(0xC)).unwrap();
    assert_eq!(bus.read_u32(REG), 0x0C00);
    assert!(matches!(
        attr.set_value(&mut bus, &AttributeValue::Uint32(0x10)),
        Err(DagError::InvalidParameter(_))
    ));
    assert!(attr.from_text(&mut bus, "0x3").unwrap());
    assert_eq!(bus.read_u32(REG), 0x0300);
}

#[test]
fn text_conversion_is_optional() {
    let mut bus = scratch_bus(CardConfig::default());
    let mut opaque = attribute(6, AttributeClass::Config, ValueType::Struct, Opaque);
    assert_eq!(opaque.to_text(&mut bus).unwrap(), None);
    assert!(!opaque.from_text(&mut bus, "010203").unwrap());
    opaque.set_value(&mut bus, &AttributeValue::Struct(vec![4])).unwrap();

    let latch = StatusLatch::new();
    let mut sample =
        attribute(7, AttributeClass::Status, ValueType::Uint32, LatchSample::new(latch.clone())).with_grw(direct());
    assert_eq!(sample.to_text(&mut bus).unwrap(), None);
}

#[test]
fn default_setter_is_unimplemented() {
    let mut bus = scratch_bus(CardConfig::default());
    let mut attr = attribute(8, AttributeClass::Config, ValueType::Uint32, Constant::new(AttributeValue::Uint32(3)));
    assert!(matches!(
        attr.set_value(&mut bus, &AttributeValue::Uint32(4)),
        Err(DagError::Unimplemented)
    ));
    assert_eq!(attr.to_text(&mut bus).unwrap().as_deref(), Some("3"));
}

#[test]
fn last_error_tells_timeout_from_zero() {
    let mut bus = scratch_bus(CardConfig::default());
    let mut real = attribute(9, AttributeClass::Status, ValueType::Uint32, RegisterWord).with_grw(direct());
    assert_eq!(real.get_value(&mut bus).unwrap(), &AttributeValue::Uint32(0));
    assert_eq!(real.grw_last_error(), None);

    let mut broken =
        attribute(10, AttributeClass::Status, ValueType::Uint32, RegisterWord).with_grw(Grw::unbound(GrwAddress(REG)));
    assert_eq!(broken.get_value(&mut bus).unwrap(), &AttributeValue::Uint32(0));
    assert_eq!(broken.grw_last_error(), Some(GrwError::ReadError));
    assert_eq!(broken.grw_last_error(), None);
}

#[test]
fn register_behavior_without_grw_is_an_error() {
    let mut bus = scratch_bus(CardConfig::default());
    let mut attr = attribute(11, AttributeClass::Status, ValueType::Uint32, RegisterWord);
    assert!(matches!(attr.get_value(&mut bus), Err(DagError::General(_))));
}

#[test]
fn grw_records_the_attribute_it_serves() {
    let attr = attribute(12, AttributeClass::Status, ValueType::Uint32, RegisterWord).with_grw(direct());
    assert_eq!(attr.grw().and_then(Grw::attribute), Some(attr.id()));
    assert_eq!(attr.owner(), ComponentId::from_parts(9, 0));
    assert_eq!(attr.name(), "active");
}

#[test]
fn behavior_producing_wrong_type_is_an_error() {
    let mut bus = scratch_bus(CardConfig::default());
    let mut attr = attribute(14, AttributeClass::Status, ValueType::Boolean, Constant::new(AttributeValue::Uint32(1)));
    assert!(matches!(attr.get_value(&mut bus), Err(DagError::InvalidParameter(_))));
}

#[test]
fn behavior_may_produce_null() {
    let mut bus = scratch_bus(CardConfig::default());
    let mut attr = attribute(15, AttributeClass::Status, ValueType::Boolean, Constant::new(AttributeValue::Null));
    assert_eq!(attr.get_value(&mut bus).unwrap(), &AttributeValue::Null);
}

#[test]
fn latch_sample_feeds_latch() {
    let mut bus = scratch_bus(CardConfig::default());
    bus.write_u32(REG, 0x5);
    let latch = StatusLatch::new();
    let mut sample =
        attribute(13, AttributeClass::Status, ValueType::Uint32, LatchSample::new(latch.clone())).with_grw(direct());
    assert_eq!(sample.get_value(&mut bus).unwrap(), &AttributeValue::Uint32(0x5));
    assert_eq!(latch.load(), 0x5);
}

proptest! {
    #[test]
    fn status_attributes_never_change(initial in any::<u32>(), value in any::<u32>()) {
        let mut bus = scratch_bus(CardConfig::default());
        bus.write_u32(REG, initial);
        let mut attr = attribute(14, AttributeClass::Status, ValueType::Uint32, RegisterWord).with_grw(direct());
        prop_assert!(attr.set_value(&mut bus, &AttributeValue::Uint32(value)).is_err());
        prop_assert_eq!(bus.read_u32(REG), initial);
    }
}
