//! # GRW Transport Tests
//!
//! Each backend against simulated hardware, plus exact polling bounds
//! against a mocked window.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use dagcfg_core::card::interconnect::Bus;
use dagcfg_core::card::traits::{Delay, NoDelay};
use dagcfg_core::common::{GrwAddress, GrwError, MdioAddress, SmbusAddress};
use dagcfg_core::config::CardConfig;
use dagcfg_core::grw::{
    CachedStatus, Direct, DrbSmbus, Grw, Mdio, MdioFamily, RawSmbus, RomRead, StatusLatch,
};
use mockall::predicate::eq;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::fixtures::{init_tracing, rom_with_serial, scratch_bus};
use crate::common::mocks;
use crate::common::sim::{MdioFlavor, SimWindow, SmbusFlavor};

const SMBUS_BASE: u64 = 0x200;
const MDIO_BASE: u64 = 0x300;
const SENSOR: u8 = 0x4C;

#[derive(Clone, Debug, Default)]
struct CountingDelay(Arc<AtomicU32>);

impl Delay for CountingDelay {
    fn delay(&self, _duration: Duration) {
        let _ = self.0.fetch_add(1, Ordering::Relaxed);
    }
}

fn quick_config(retries: u32) -> CardConfig {
    let mut config = CardConfig::default();
    config.smbus.retries = retries;
    config.smbus.poll_delay_us = 0;
    config.mdio.settle_us = 0;
    config
}

fn smbus_grw(flavor: SmbusFlavor, register: u8) -> Grw {
    let addr = SmbusAddress {
        device_register: register,
        device_address: SENSOR,
        line: 0,
        sub_bus: 0,
    };
    match flavor {
        SmbusFlavor::Raw => Grw::new(addr, RawSmbus::new(SMBUS_BASE)),
        SmbusFlavor::Drb => Grw::new(addr, DrbSmbus::new(SMBUS_BASE)),
    }
}

fn mdio_family(flavor: MdioFlavor) -> MdioFamily {
    match flavor {
        MdioFlavor::Mac => MdioFamily::Mac,
        MdioFlavor::Iom => MdioFamily::Iom,
    }
}

#[rstest]
#[case(SmbusFlavor::Raw)]
#[case(SmbusFlavor::Drb)]
fn smbus_reads_and_writes_slave_registers(#[case] flavor: SmbusFlavor) {
    init_tracing();
    let (window, devices) = SimWindow::new(0x1000).with_smbus(SMBUS_BASE, flavor, false);
    let _ = devices.lock().unwrap().insert((SENSOR, 0x00), 0x2A);
    let mut bus = Bus::new(Box::new(window), Box::new(NoDelay), quick_config(10));

    let mut temp = smbus_grw(flavor, 0x00);
    assert_eq!(temp.read(&mut bus), 0x2A);
    assert_eq!(temp.take_last_error(), None);

    let mut limit = smbus_grw(flavor, 0x05);
    limit.write(&mut bus, 0x55);
    assert_eq!(limit.take_last_error(), None);
    assert_eq!(devices.lock().unwrap().get(&(SENSOR, 0x05)), Some(&0x55));
    assert_eq!(limit.read(&mut bus), 0x55);
}

#[rstest]
#[case(SmbusFlavor::Raw)]
#[case(SmbusFlavor::Drb)]
fn smbus_absent_device_latches_error(#[case] flavor: SmbusFlavor) {
    let (window, _devices) = SimWindow::new(0x1000).with_smbus(SMBUS_BASE, flavor, false);
    let mut bus = Bus::new(Box::new(window), Box::new(NoDelay), quick_config(10));
    let mut g = smbus_grw(flavor, 0x00);
    assert_eq!(g.read(&mut bus), 0);
    assert_eq!(g.take_last_error(), Some(GrwError::ReadError));
    g.write(&mut bus, 1);
    assert_eq!(g.take_last_error(), Some(GrwError::WriteError));
}

#[rstest]
#[case(SmbusFlavor::Raw)]
#[case(SmbusFlavor::Drb)]
fn smbus_stuck_controller_gives_up(#[case] flavor: SmbusFlavor) {
    let (window, _devices) = SimWindow::new(0x1000).with_smbus(SMBUS_BASE, flavor, true);
    let sleeps = CountingDelay::default();
    let mut bus = Bus::new(Box::new(window), Box::new(sleeps.clone()), quick_config(6));
    let mut g = smbus_grw(flavor, 0x00);
    assert_eq!(g.read(&mut bus), 0);
    assert_eq!(g.take_last_error(), Some(GrwError::ReadError));
    assert_eq!(sleeps.0.load(Ordering::Relaxed), 5);
}

#[test]
fn raw_smbus_polls_exactly_the_retry_budget() {
    let mut regs = mocks::registers();
    let _ = regs.expect_write_u32().with(eq(SMBUS_BASE), mockall::predicate::always()).times(1).return_const(());
    let _ = regs.expect_read_u32().with(eq(SMBUS_BASE + 4)).times(7).return_const(0u32);
    let mut bus = Bus::new(Box::new(regs), Box::new(NoDelay), quick_config(7));

    let mut g = smbus_grw(SmbusFlavor::Raw, 0x00);
    g.write(&mut bus, 0x12);
    assert_eq!(g.take_last_error(), Some(GrwError::WriteError));
}

#[test]
fn drb_smbus_polls_exactly_the_retry_budget() {
    let mut regs = mocks::registers();
    let _ = regs.expect_write_u32().times(3).return_const(());
    let _ = regs
        .expect_read_u32()
        .with(eq(SMBUS_BASE + 8))
        .times(4)
        .return_const(1u32 << 31);
    let mut bus = Bus::new(Box::new(regs), Box::new(NoDelay), quick_config(4));

    let mut g = smbus_grw(SmbusFlavor::Drb, 0x00);
    g.write(&mut bus, 0x12);
    assert_eq!(g.take_last_error(), Some(GrwError::WriteError));
}

#[rstest]
#[case(MdioFlavor::Mac)]
#[case(MdioFlavor::Iom)]
fn mdio_round_trip(#[case] flavor: MdioFlavor) {
    let (window, phy) = SimWindow::new(0x1000).with_mdio(MDIO_BASE, flavor, false);
    let _ = phy.lock().unwrap().insert((0, 1, 2), 0x0141);
    let mut bus = Bus::new(Box::new(window), Box::new(NoDelay), quick_config(4));

    let id = MdioAddress {
        device: 0,
        mmd: 1,
        register: 2,
    };
    let mut g = Grw::new(id, Mdio::new(mdio_family(flavor), MDIO_BASE));
    assert_eq!(g.read(&mut bus), 0x0141);

    let ctrl = MdioAddress {
        device: 0,
        mmd: 1,
        register: 0,
    };
    let mut c = Grw::new(ctrl, Mdio::new(mdio_family(flavor), MDIO_BASE));
    c.write_bit(&mut bus, 1 << 0, true);
    assert_eq!(c.take_last_error(), None);
    assert_eq!(phy.lock().unwrap().get(&(0, 1, 0)), Some(&1));
}

#[test]
fn mdio_data_never_valid_polls_attempt_budget() {
    let (window, _phy) = SimWindow::new(0x1000).with_mdio(MDIO_BASE, MdioFlavor::Mac, true);
    let log = window.read_log();
    let mut bus = Bus::new(Box::new(window), Box::new(NoDelay), quick_config(4));

    let mut g = Grw::new(MdioAddress::default(), Mdio::new(MdioFamily::Mac, MDIO_BASE));
    assert_eq!(g.read(&mut bus), 0);
    assert_eq!(g.take_last_error(), Some(GrwError::ReadError));
    let data_reads = log.lock().unwrap().iter().filter(|o| **o == MDIO_BASE + 4).count();
    assert_eq!(data_reads, 4);
}

#[test]
fn rom_reads_trailer_words() {
    let mut bus = scratch_bus(CardConfig::default()).with_rom(rom_with_serial(0x00C0_FFEE));
    let mut g = Grw::new(GrwAddress(0), RomRead);
    assert_eq!(g.read(&mut bus), 0x00C0_FFEE);
    g.write(&mut bus, 1);
    assert_eq!(g.take_last_error(), Some(GrwError::WriteError));
}

#[test]
fn rom_without_image_fails() {
    let mut bus = scratch_bus(CardConfig::default());
    let mut g = Grw::new(GrwAddress(0), RomRead);
    assert_eq!(g.read(&mut bus), 0);
    assert_eq!(g.take_last_error(), Some(GrwError::ReadError));
}

#[test]
fn cached_status_reads_latch_without_transaction() {
    let mut regs = mocks::registers();
    let _ = regs.expect_read_u32().never();
    let mut bus = Bus::new(Box::new(regs), Box::new(NoDelay), CardConfig::default());

    let latch = StatusLatch::new();
    let mut g = Grw::new(GrwAddress(0x44), CachedStatus::new(latch.clone()));
    latch.store(0b101);
    assert!(g.read_bit(&mut bus, 0b001));
    assert!(!g.read_bit(&mut bus, 0b010));
    g.write(&mut bus, 0);
    assert_eq!(g.take_last_error(), Some(GrwError::WriteError));
}

#[rstest]
#[case(0x1_0000)]
#[case(0xFFFE)]
#[case(0x0002)]
fn direct_rejects_out_of_window_or_unaligned(#[case] offset: u64) {
    let mut bus = scratch_bus(CardConfig::default());
    let mut g = Grw::new(GrwAddress(offset), Direct);
    assert_eq!(g.read(&mut bus), 0);
    assert_eq!(g.take_last_error(), Some(GrwError::ReadError));
}
