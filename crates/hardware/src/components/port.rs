//! Network port (MAC block).
//!
//! # Registers (relative to the module base)
//!
//! * `+0x00`: Config. `[0]` enable, `[1]` NIC mode (version 1+), `[2]` MAC loopback.
//! * `+0x04`: Status. `[0]` link, `[1]` local fault, `[2]` remote fault.
//! * `+0x10`: MDIO master (MAC family) for the port's PHY.
//!
//! The status word is sampled into a latch by the `status_snapshot` attribute
//! and at post-initialization; the link and fault attributes read the latch.

use crate::common::{GrwAddress, MdioAddress, Result};
use crate::components::{Assembler, BuildContext};
use crate::discovery::RegisterEntry;
use crate::grw::{CachedStatus, Direct, Grw, Mdio, MdioFamily, StatusLatch};
use crate::model::{
    AttributeCode, AttributeValue, Component, ComponentBehavior, ComponentCode, ComponentContext, LatchSample,
    LatchedBit, RegisterBit, RegisterWord, ValueType,
};

/// Config register offset.
pub const CONFIG: u64 = 0x00;
/// Status register offset.
pub const STATUS: u64 = 0x04;
/// MDIO master offset.
pub const MDIO: u64 = 0x10;

/// Port enable.
pub const CONFIG_ENABLE: u32 = 1 << 0;
/// Auto-negotiation.
pub const CONFIG_NIC: u32 = 1 << 1;
/// MAC loopback.
pub const CONFIG_LOOPBACK: u32 = 1 << 2;

/// Link up.
pub const STATUS_LINK: u32 = 1 << 0;
/// Local fault.
pub const STATUS_LOCAL_FAULT: u32 = 1 << 1;
/// Remote fault.
pub const STATUS_REMOTE_FAULT: u32 = 1 << 2;

/// PHY identifier: PMA/PMD device 1, register 2.
pub const PHY_ID: MdioAddress = MdioAddress {
    device: 0,
    mmd: 1,
    register: 2,
};
/// PCS control: device 3, register 0; bit 14 loopback.
pub const PCS_CONTROL: MdioAddress = MdioAddress {
    device: 0,
    mmd: 3,
    register: 0,
};
/// PCS loopback bit.
pub const PCS_LOOPBACK: u32 = 1 << 14;

#[derive(Debug)]
struct Port {
    latch: StatusLatch,
}

impl ComponentBehavior for Port {
    fn reset(&mut self, ctx: &mut ComponentContext<'_>) -> Result<()> {
        self.latch.store(0);
        ctx.set(AttributeCode::Loopback, &AttributeValue::Boolean(false))
    }

    fn set_defaults(&mut self, ctx: &mut ComponentContext<'_>) -> Result<()> {
        ctx.set(AttributeCode::Active, &AttributeValue::Boolean(true))?;
        ctx.set(AttributeCode::Loopback, &AttributeValue::Boolean(false))?;
        if ctx.attribute(AttributeCode::Nic).is_ok() {
            ctx.set(AttributeCode::Nic, &AttributeValue::Boolean(true))?;
        }
        Ok(())
    }

    fn update_register_base(&mut self, ctx: &mut ComponentContext<'_>, entry: &RegisterEntry) -> Result<()> {
        for code in [AttributeCode::Active, AttributeCode::Nic, AttributeCode::Loopback] {
            if let Some(grw) = ctx.grw(code) {
                let _ = grw.set_address(GrwAddress(entry.base + CONFIG));
            }
        }
        if let Some(grw) = ctx.grw(AttributeCode::StatusSnapshot) {
            let _ = grw.set_address(GrwAddress(entry.base + STATUS));
        }
        for code in [AttributeCode::PhyIdentifier, AttributeCode::PhyLoopback] {
            if let Some(grw) = ctx.grw(code) {
                let _ = grw.set_access(Mdio::new(MdioFamily::Mac, entry.base + MDIO));
            }
        }
        Ok(())
    }
}

/// Builds a port from its table entry.
pub fn build(ctx: &mut BuildContext<'_>, entry: RegisterEntry, index: u32) -> Component {
    let latch = StatusLatch::new();
    let config = || Grw::new(GrwAddress(entry.base + CONFIG), Direct);
    let cached = || Grw::new(GrwAddress(entry.base + STATUS), CachedStatus::new(latch.clone()));
    let mdio = |addr: MdioAddress| Grw::new(addr, Mdio::new(MdioFamily::Mac, entry.base + MDIO));

    let mut a = Assembler::new(ctx.ids, ComponentCode::Port, index, Port { latch: latch.clone() }).module(entry, index);
    a.config(AttributeCode::Active, ValueType::Boolean, RegisterBit::new(CONFIG_ENABLE), config());
    if entry.version >= 1 {
        a.config(AttributeCode::Nic, ValueType::Boolean, RegisterBit::new(CONFIG_NIC), config());
    }
    a.config(AttributeCode::Loopback, ValueType::Boolean, RegisterBit::new(CONFIG_LOOPBACK), config());
    a.status(
        AttributeCode::StatusSnapshot,
        ValueType::Uint32,
        LatchSample::new(latch.clone()),
        Grw::new(GrwAddress(entry.base + STATUS), Direct),
    );
    a.status(AttributeCode::Link, ValueType::Boolean, LatchedBit::new(STATUS_LINK), cached());
    a.status(AttributeCode::LocalFault, ValueType::Boolean, LatchedBit::new(STATUS_LOCAL_FAULT), cached());
    a.status(AttributeCode::RemoteFault, ValueType::Boolean, LatchedBit::new(STATUS_REMOTE_FAULT), cached());
    a.status(AttributeCode::PhyIdentifier, ValueType::Uint32, RegisterWord, mdio(PHY_ID));
    a.config(AttributeCode::PhyLoopback, ValueType::Boolean, RegisterBit::new(PCS_LOOPBACK), mdio(PCS_CONTROL));
    a.finish()
}
