//! # Discovery Tests
//!
//! Building the capability tree from an enumeration table, and rebasing it
//! after the table changes.

use dagcfg_core::card::SensorLocation;
use dagcfg_core::components::{port, stream};
use dagcfg_core::discovery::{ModuleCode, RegisterEntry, encode_table};
use dagcfg_core::model::{AttributeCode, AttributeValue, Component, ComponentCode};
use dagcfg_core::{Card, CardIdentity};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::fixtures::offline_card;

const MAC0_A: RegisterEntry = RegisterEntry::new(ModuleCode::MAC, 0, 0x1000);
const MAC1: RegisterEntry = RegisterEntry::new(ModuleCode::MAC, 1, 0x1100);
const MAC0_B: RegisterEntry = RegisterEntry::new(ModuleCode::MAC, 0, 0x1200);
const PBM: RegisterEntry = RegisterEntry::new(ModuleCode::PBM, 0, 0x2000);
const GPP: RegisterEntry = RegisterEntry::new(ModuleCode::GPP, 1, 0x3000);
const IOM: RegisterEntry = RegisterEntry::new(ModuleCode::IOM, 0, 0x4000);

fn names(card: &Card) -> Vec<&str> {
    card.root().children().iter().map(Component::name).collect()
}

fn port_bases(card: &Card) -> Vec<(u32, u64)> {
    card.root()
        .children()
        .iter()
        .filter(|c| c.code() == ComponentCode::Port)
        .filter_map(|c| c.module().map(|m| (c.index(), m.entry.base)))
        .collect()
}

fn rewrite_table(card: &mut Card, table: &[RegisterEntry]) {
    let bus = card.bus();
    for (i, word) in encode_table(table).into_iter().enumerate() {
        bus.write_u32(i as u64 * 4, word);
    }
}

#[test]
fn children_follow_registry_order() {
    let mut identity = CardIdentity::new(0x3500);
    identity.rx_streams = 1;
    let card = offline_card(identity, &[IOM, GPP, PBM, MAC1]);
    assert_eq!(names(&card), ["card_info", "port0", "pbm0", "stream0", "stream1", "gpp0", "phy0"]);
}

#[test]
fn indices_run_per_module_code_across_versions() {
    let card = offline_card(CardIdentity::new(0x3500), &[MAC0_A, MAC1, MAC0_B]);
    // Version 0 rows are visited before version 1.
    assert_eq!(port_bases(&card), [(0, 0x1000), (1, 0x1200), (2, 0x1100)]);
}

#[test]
fn version_gates_attributes() {
    let card = offline_card(CardIdentity::new(0x3500), &[MAC0_A, MAC1]);
    let v0 = card.find_component(ComponentCode::Port, 0).unwrap();
    let v1 = card.find_component(ComponentCode::Port, 1).unwrap();
    assert!(card.attribute_of(v0, AttributeCode::Nic).is_err());
    assert!(card.attribute_of(v1, AttributeCode::Nic).is_ok());
}

#[rstest]
#[case(0, 0, 0)]
#[case(1, 0, 2)]
#[case(2, 3, 6)]
#[case(4, 1, 8)]
fn stream_count_is_twice_the_larger_direction(#[case] rx: u32, #[case] tx: u32, #[case] expected: usize) {
    let mut identity = CardIdentity::new(0x3500);
    identity.rx_streams = rx;
    identity.tx_streams = tx;
    let card = offline_card(identity, &[PBM]);
    let streams = card.root().children().iter().filter(|c| c.code() == ComponentCode::Stream).count();
    assert_eq!(streams, expected);
}

#[test]
fn streams_need_a_buffer_manager() {
    let mut identity = CardIdentity::new(0x3500);
    identity.rx_streams = 2;
    let card = offline_card(identity, &[MAC0_A]);
    assert!(card.find_component(ComponentCode::Stream, 0).is_err());
}

#[test]
fn stream_direction_alternates() {
    let mut identity = CardIdentity::new(0x3500);
    identity.tx_streams = 1;
    let mut card = offline_card(identity, &[PBM]);
    for (n, expected) in [(0, "rx"), (1, "tx")] {
        let s = card.find_component(ComponentCode::Stream, n).unwrap();
        let dir = card.attribute_of(s, AttributeCode::Direction).unwrap();
        assert_eq!(card.get_attribute(dir).unwrap(), &AttributeValue::String(expected.into()));
    }
}

#[test]
fn unknown_modules_are_skipped() {
    let odd = RegisterEntry::new(ModuleCode(0x77), 0, 0x5000);
    let future_mac = RegisterEntry::new(ModuleCode::MAC, 9, 0x5100);
    let card = offline_card(CardIdentity::new(0x3500), &[odd, future_mac, MAC0_A]);
    assert_eq!(names(&card), ["card_info", "port0"]);
}

#[test]
fn sensor_follows_card_info_when_fitted() {
    let mut identity = CardIdentity::new(0x3500);
    identity.sensor = Some(SensorLocation {
        device_address: 0x4C,
        line: 0,
        sub_bus: 0,
    });
    let card = offline_card(identity, &[MAC0_A]);
    assert_eq!(names(&card), ["card_info", "sensor", "port0"]);
}

#[test]
fn empty_table_leaves_card_info_only() {
    let card = offline_card(CardIdentity::new(0x3500), &[]);
    assert_eq!(names(&card), ["card_info"]);
    assert_eq!(card.root().code(), ComponentCode::Root);
}

#[test]
fn rebase_moves_port_registers() {
    let mut card = offline_card(CardIdentity::new(0x3500), &[MAC0_A, MAC0_B]);
    let moved = RegisterEntry::new(ModuleCode::MAC, 0, 0x6000);
    rewrite_table(&mut card, &[moved, MAC0_A]);
    card.update_register_base().unwrap();
    assert_eq!(port_bases(&card), [(0, 0x6000), (1, 0x1000)]);

    let p0 = card.find_component(ComponentCode::Port, 0).unwrap();
    let active = card.attribute_of(p0, AttributeCode::Active).unwrap();
    card.set_attribute(active, &AttributeValue::Boolean(true)).unwrap();
    assert_eq!(card.bus().read_u32(0x6000 + port::CONFIG), port::CONFIG_ENABLE);
    assert_eq!(card.bus().read_u32(0x1000 + port::CONFIG), 0);
}

#[test]
fn rebase_keeps_missing_modules_in_place() {
    let mut card = offline_card(CardIdentity::new(0x3500), &[MAC0_A, MAC0_B]);
    rewrite_table(&mut card, &[RegisterEntry::new(ModuleCode::MAC, 0, 0x7000)]);
    card.update_register_base().unwrap();
    assert_eq!(port_bases(&card), [(0, 0x7000), (1, 0x1200)]);
}

#[test]
fn rebase_carries_streams_with_their_buffer_manager() {
    let mut identity = CardIdentity::new(0x3500);
    identity.rx_streams = 1;
    let mut card = offline_card(identity, &[PBM]);
    rewrite_table(&mut card, &[RegisterEntry::new(ModuleCode::PBM, 0, 0x8000)]);
    card.update_register_base().unwrap();

    let s1 = card.find_component(ComponentCode::Stream, 1).unwrap();
    let mem = card.attribute_of(s1, AttributeCode::MemoryMegabytes).unwrap();
    card.set_attribute(mem, &AttributeValue::Uint32(64)).unwrap();
    assert_eq!(card.bus().read_u32(stream::block(0x8000, 1) + stream::MEMORY), 64);
}
