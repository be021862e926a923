//! External PHY reached through an I/O module's tunnelled MDIO bus.
//!
//! All registers are clause 45 PMA/PMD (device 1) registers behind the IOM
//! master at the module base.

use crate::common::{GrwAddress, MdioAddress, Result};
use crate::components::{Assembler, BuildContext};
use crate::discovery::RegisterEntry;
use crate::grw::{Grw, Mdio, MdioFamily};
use crate::model::{
    AttributeCode, AttributeValue, Component, ComponentBehavior, ComponentCode, ComponentContext, RegisterBit,
    RegisterWord, ValueType,
};

/// PMA/PMD control 1.
pub const PMA_CONTROL: MdioAddress = MdioAddress {
    device: 0,
    mmd: 1,
    register: 0,
};
/// PMA/PMD status 1.
pub const PMA_STATUS: MdioAddress = MdioAddress {
    device: 0,
    mmd: 1,
    register: 1,
};
/// PMA/PMD identifier.
pub const PMA_ID: MdioAddress = MdioAddress {
    device: 0,
    mmd: 1,
    register: 2,
};

/// Soft reset (control 1).
pub const CONTROL_RESET: u32 = 1 << 15;
/// PMA loopback (control 1).
pub const CONTROL_LOOPBACK: u32 = 1 << 0;
/// Receive link (status 1).
pub const STATUS_LINK: u32 = 1 << 2;

#[derive(Debug)]
struct Phy {
    base: u64,
}

impl ComponentBehavior for Phy {
    fn reset(&mut self, ctx: &mut ComponentContext<'_>) -> Result<()> {
        let mut control = Grw::new(PMA_CONTROL, Mdio::new(MdioFamily::Iom, self.base));
        control.write(ctx.bus(), CONTROL_RESET);
        control.take_last_error().map_or(Ok(()), |e| Err(e.into()))
    }

    fn set_defaults(&mut self, ctx: &mut ComponentContext<'_>) -> Result<()> {
        ctx.set(AttributeCode::PhyLoopback, &AttributeValue::Boolean(false))
    }

    fn update_register_base(&mut self, ctx: &mut ComponentContext<'_>, entry: &RegisterEntry) -> Result<()> {
        self.base = entry.base;
        for code in [
            AttributeCode::PhyIdentifier,
            AttributeCode::PhyLink,
            AttributeCode::PhyReset,
            AttributeCode::PhyLoopback,
        ] {
            if let Some(grw) = ctx.grw(code) {
                let _ = grw.set_access(Mdio::new(MdioFamily::Iom, entry.base));
            }
        }
        Ok(())
    }
}

/// Builds a PHY from its IOM table entry.
pub fn build(ctx: &mut BuildContext<'_>, entry: RegisterEntry, index: u32) -> Component {
    let mdio = |addr: MdioAddress| Grw::new(GrwAddress::from(addr), Mdio::new(MdioFamily::Iom, entry.base));
    let mut a = Assembler::new(ctx.ids, ComponentCode::Phy, index, Phy { base: entry.base }).module(entry, index);
    a.status(AttributeCode::PhyIdentifier, ValueType::Uint32, RegisterWord, mdio(PMA_ID));
    a.status(AttributeCode::PhyLink, ValueType::Boolean, RegisterBit::new(STATUS_LINK), mdio(PMA_STATUS));
    a.config(AttributeCode::PhyReset, ValueType::Boolean, RegisterBit::new(CONTROL_RESET), mdio(PMA_CONTROL));
    a.config(AttributeCode::PhyLoopback, ValueType::Boolean, RegisterBit::new(CONTROL_LOOPBACK), mdio(PMA_CONTROL));
    a.finish()
}
