//! # Card Tests
//!
//! Opening cards, id validation, lifecycle passes over the tree, inventory
//! and firmware checks.

use dagcfg_core::card::region::MappedRegion;
use dagcfg_core::components::{gpp, pbm, port, stream};
use dagcfg_core::config::CardConfig;
use dagcfg_core::discovery::enumeration::TERMINATOR_WORD;
use dagcfg_core::discovery::{ModuleCode, RegisterEntry};
use dagcfg_core::model::{AttributeCode, AttributeId, AttributeValue, ComponentCode, ComponentId};
use dagcfg_core::card::MAX_STREAMS;
use dagcfg_core::{Card, CardBuilder, CardIdentity, DagError, GrwError};
use mockall::predicate::eq;
use pretty_assertions::assert_eq;

use crate::common::fixtures::{bitstream, init_tracing, offline_card, rom_with_serial};
use crate::common::mocks;

const MAC: RegisterEntry = RegisterEntry::new(ModuleCode::MAC, 1, 0x1000);
const PBM: RegisterEntry = RegisterEntry::new(ModuleCode::PBM, 0, 0x2000);
const GPP: RegisterEntry = RegisterEntry::new(ModuleCode::GPP, 0, 0x3000);

fn full_card() -> Card {
    let mut identity = CardIdentity::new(0x3500);
    identity.rx_streams = 1;
    offline_card(identity, &[MAC, PBM, GPP])
}

fn attr(card: &Card, code: ComponentCode, index: u32, attribute: AttributeCode) -> AttributeId {
    let c = card.find_component(code, index).unwrap();
    card.attribute_of(c, attribute).unwrap()
}

#[test]
fn card_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<Card>();
}

#[test]
fn ids_from_another_card_are_rejected() {
    let mut a = full_card();
    let mut b = full_card();
    assert_ne!(a.serial(), b.serial());

    let active_a = attr(&a, ComponentCode::Port, 0, AttributeCode::Active);
    assert!(matches!(b.get_attribute(active_a), Err(DagError::InvalidCardRef)));
    assert!(matches!(
        b.set_attribute(active_a, &AttributeValue::Boolean(true)),
        Err(DagError::InvalidCardRef)
    ));
    let port_a = a.find_component(ComponentCode::Port, 0).unwrap();
    assert!(matches!(b.component(port_a), Err(DagError::InvalidCardRef)));
    assert!(a.get_attribute(active_a).is_ok());
}

#[test]
fn unknown_ids_and_codes() {
    let card = full_card();
    let serial = card.serial();
    assert!(matches!(
        card.component(ComponentId::from_parts(serial, 9_999)),
        Err(DagError::NoSuchComponent)
    ));
    assert!(matches!(
        card.attribute(AttributeId::from_parts(serial, 9_999)),
        Err(DagError::NoSuchAttribute)
    ));
    assert!(matches!(card.find_component(ComponentCode::Phy, 0), Err(DagError::NoSuchComponent)));
    let pbm = card.find_component(ComponentCode::PacketBufferManager, 0).unwrap();
    assert!(matches!(
        card.attribute_of(pbm, AttributeCode::SnapLength),
        Err(DagError::NoSuchAttribute)
    ));
}

#[test]
fn status_attributes_are_read_only_through_the_card() {
    let mut card = full_card();
    let device = attr(&card, ComponentCode::CardInfo, 0, AttributeCode::PciDeviceId);
    assert_eq!(card.get_attribute(device).unwrap(), &AttributeValue::Uint32(0x3500));
    assert!(matches!(
        card.set_attribute(device, &AttributeValue::Uint32(1)),
        Err(DagError::StatusAttribute)
    ));
    assert!(matches!(card.attribute_from_text(device, "1"), Err(DagError::StatusAttribute)));
}

#[test]
fn text_round_trip_through_the_card() {
    let mut card = full_card();
    let nic = attr(&card, ComponentCode::Port, 0, AttributeCode::Nic);
    assert!(card.attribute_from_text(nic, "on").unwrap());
    assert_eq!(card.attribute_to_text(nic).unwrap().as_deref(), Some("on"));
    assert_eq!(card.bus().read_u32(0x1000 + port::CONFIG), port::CONFIG_NIC);
}

#[test]
fn set_defaults_programs_every_module() {
    let mut card = full_card();
    card.set_defaults().unwrap();
    let bus = card.bus();
    assert_eq!(
        bus.read_u32(0x1000 + port::CONFIG),
        port::CONFIG_ENABLE | port::CONFIG_NIC
    );
    assert_eq!(bus.read_u32(0x2000 + pbm::CONFIG), pbm::CONFIG_DROP);
    assert_eq!(
        bus.read_u32(0x3000 + gpp::CONFIG),
        gpp::DEFAULT_SNAP_LENGTH | gpp::VARLEN
    );
}

#[test]
fn reset_returns_blocks_to_power_on_state() {
    let mut card = full_card();
    let loopback = attr(&card, ComponentCode::Port, 0, AttributeCode::Loopback);
    card.set_attribute(loopback, &AttributeValue::Boolean(true)).unwrap();
    card.bus().write_u32(stream::block(0x2000, 1) + stream::DROP_COUNT, 17);

    card.reset().unwrap();
    assert_eq!(card.get_attribute(loopback).unwrap(), &AttributeValue::Boolean(false));
    let bus = card.bus();
    assert_eq!(bus.read_u32(0x2000 + pbm::CONFIG) & pbm::CONFIG_RESET, pbm::CONFIG_RESET);
    assert_eq!(bus.read_u32(stream::block(0x2000, 1) + stream::DROP_COUNT), 0);
}

#[test]
fn inventory_describes_the_tree() {
    let card = full_card();
    let json: serde_json::Value = serde_json::from_str(&card.inventory_json().unwrap()).unwrap();
    assert_eq!(json["name"], "root");
    let children = json["children"].as_array().unwrap();
    assert_eq!(children[0]["name"], "card_info");
    assert!(children[0].get("register_base").is_none());
    assert_eq!(children[1]["name"], "port0");
    assert_eq!(children[1]["register_base"], 0x1000);

    let summary = card.inventory();
    assert_eq!(summary.children.len(), 6);
    let names: Vec<_> = summary.children[1].attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names[..3], ["active", "nic", "loopback"]);
}

#[test]
fn serial_number_comes_from_rom() {
    init_tracing();
    let mut card = CardBuilder::new(CardIdentity::new(0x3500))
        .rom(rom_with_serial(0x00C0_FFEE))
        .offline(&[])
        .open()
        .unwrap();
    let serial = attr(&card, ComponentCode::CardInfo, 0, AttributeCode::SerialNumber);
    assert_eq!(card.get_attribute(serial).unwrap(), &AttributeValue::Uint32(0x00C0_FFEE));
    assert_eq!(card.attribute_last_error(serial).unwrap(), None);
}

#[test]
fn serial_number_without_rom_latches_error() {
    let mut card = offline_card(CardIdentity::new(0x3500), &[]);
    let serial = attr(&card, ComponentCode::CardInfo, 0, AttributeCode::SerialNumber);
    assert_eq!(card.get_attribute(serial).unwrap(), &AttributeValue::Uint32(0));
    assert_eq!(card.attribute_last_error(serial).unwrap(), Some(GrwError::ReadError));
}

#[test]
fn firmware_check_uses_card_identity() {
    let card = full_card();
    card.check_firmware(&bitstream("dag35pci_v2", "2s200fg256"), 0).unwrap();
    assert!(matches!(
        card.check_firmware(&bitstream("dag38s", "2v1000fg456"), 0),
        Err(DagError::FirmwareVerifyFailed)
    ));
    assert!(matches!(
        card.check_firmware(&bitstream("dag35pci_v2", "2s200fg256"), 5),
        Err(DagError::CardNotSupported)
    ));
}

#[test]
fn open_needs_exactly_one_window() {
    let identity = CardIdentity::new(0x3500);
    assert!(matches!(
        CardBuilder::new(identity.clone()).open(),
        Err(DagError::InvalidParameter(_))
    ));
    let both = CardBuilder::new(identity)
        .registers(MappedRegion::anonymous(0x1000).unwrap())
        .offline(&[MAC])
        .open();
    assert!(matches!(both, Err(DagError::InvalidParameter(_))));
}

#[test]
fn offline_table_must_fit_window() {
    let mut config = CardConfig::default();
    config.offline.register_window_size = 8;
    let result = CardBuilder::new(CardIdentity::new(0x3500))
        .config(config)
        .offline(&[MAC, PBM])
        .open();
    assert!(matches!(result, Err(DagError::InvalidParameter(_))));
}

#[test]
fn empty_table_reads_one_word() {
    init_tracing();
    let mut regs = mocks::registers();
    let _ = regs
        .expect_read_u32()
        .with(eq(0))
        .times(1)
        .return_const(TERMINATOR_WORD);
    let card = CardBuilder::new(CardIdentity::new(0x3500)).registers(regs).open().unwrap();
    assert_eq!(card.root().children().len(), 1);
}

#[test]
fn offline_table_base_near_address_limit_is_rejected() {
    for base in [u64::MAX - 3, u64::MAX - 7, 0xFFFF_FFFF_FFFF_0000] {
        let mut config = CardConfig::default();
        config.enum_table.base_offset = base;
        let result = CardBuilder::new(CardIdentity::new(0x3500))
            .config(config)
            .offline(&[MAC])
            .open();
        assert!(matches!(result, Err(DagError::InvalidParameter(_))), "base {base:#x}");
    }
}

#[test]
fn live_table_base_near_address_limit_reads_nothing() {
    init_tracing();
    let mut config = CardConfig::default();
    config.enum_table.base_offset = u64::MAX - 3;
    // No read expectations: any register access fails the test.
    let card = CardBuilder::new(CardIdentity::new(0x3500))
        .config(config)
        .registers(mocks::registers())
        .open()
        .unwrap();
    assert_eq!(card.root().children().len(), 1);
    assert!(card.find_component(ComponentCode::CardInfo, 0).is_ok());
}

#[test]
fn oversized_stream_counts_are_rejected() {
    for (rx, tx) in [(0x8000_0000, 0), (0, u32::MAX), (MAX_STREAMS / 2 + 1, 0)] {
        let mut identity = CardIdentity::new(0x3500);
        identity.rx_streams = rx;
        identity.tx_streams = tx;
        let result = CardBuilder::new(identity).offline(&[MAC, PBM]).open();
        assert!(matches!(result, Err(DagError::InvalidParameter(_))), "rx {rx} tx {tx}");
    }
}

#[test]
fn stream_count_at_limit_opens() {
    let mut identity = CardIdentity::new(0x3500);
    identity.tx_streams = MAX_STREAMS / 2;
    let card = CardBuilder::new(identity).offline(&[MAC, PBM]).open().unwrap();
    let last = MAX_STREAMS - 1;
    assert!(card.find_component(ComponentCode::Stream, last).is_ok());
    assert!(card.find_component(ComponentCode::Stream, last + 1).is_err());
}
