//! Packet processor: capture record shaping.
//!
//! # Registers (relative to the module base)
//!
//! * `+0x00`: Config. `[15:0]` snap length, `[16]` variable-length records,
//!   `[17]` 64-byte record alignment (version 1+).

use crate::common::{GrwAddress, Result};
use crate::components::{Assembler, BuildContext};
use crate::discovery::RegisterEntry;
use crate::grw::{Direct, Grw};
use crate::model::{
    AttributeCode, AttributeValue, Component, ComponentBehavior, ComponentCode, ComponentContext, RegisterBit,
    RegisterField, ValueType,
};

/// Config register offset.
pub const CONFIG: u64 = 0x00;
/// Snap length field.
pub const SNAP_LENGTH: u32 = 0xFFFF;
/// Variable-length records.
pub const VARLEN: u32 = 1 << 16;
/// 64-byte alignment.
pub const ALIGN64: u32 = 1 << 17;

/// Snap length applied by `set_defaults`.
pub const DEFAULT_SNAP_LENGTH: u32 = 1536;

#[derive(Debug)]
struct Gpp;

impl ComponentBehavior for Gpp {
    fn set_defaults(&mut self, ctx: &mut ComponentContext<'_>) -> Result<()> {
        ctx.set(AttributeCode::SnapLength, &AttributeValue::Uint32(DEFAULT_SNAP_LENGTH))?;
        ctx.set(AttributeCode::VariableLength, &AttributeValue::Boolean(true))
    }

    fn update_register_base(&mut self, ctx: &mut ComponentContext<'_>, entry: &RegisterEntry) -> Result<()> {
        for code in [AttributeCode::SnapLength, AttributeCode::VariableLength, AttributeCode::Align64] {
            if let Some(grw) = ctx.grw(code) {
                let _ = grw.set_address(GrwAddress(entry.base + CONFIG));
            }
        }
        Ok(())
    }
}

/// Builds a packet processor from its table entry.
pub fn build(ctx: &mut BuildContext<'_>, entry: RegisterEntry, index: u32) -> Component {
    let config = || Grw::new(GrwAddress(entry.base + CONFIG), Direct);
    let mut a = Assembler::new(ctx.ids, ComponentCode::PacketProcessor, index, Gpp).module(entry, index);
    a.config(AttributeCode::SnapLength, ValueType::Uint32, RegisterField::new(SNAP_LENGTH), config());
    a.config(AttributeCode::VariableLength, ValueType::Boolean, RegisterBit::new(VARLEN), config());
    if entry.version >= 1 {
        a.config(AttributeCode::Align64, ValueType::Boolean, RegisterBit::new(ALIGN64), config());
    }
    a.finish()
}
