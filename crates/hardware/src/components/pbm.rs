//! Packet buffer manager.
//!
//! # Registers (relative to the module base)
//!
//! * `+0x00`: Config. `[0]` drop when full, `[31]` soft reset (self-clearing).
//! * `+0x04`: Host buffer size in MiB.
//! * `+0x100`: Per-stream blocks, see [`crate::components::stream`].

use tracing::debug;

use crate::common::{GrwAddress, Result};
use crate::components::{Assembler, BuildContext};
use crate::discovery::RegisterEntry;
use crate::grw::{Direct, Grw};
use crate::model::{
    AttributeCode, AttributeValue, Component, ComponentBehavior, ComponentCode, ComponentContext, RegisterBit,
    RegisterWord, ValueType,
};

/// Config register offset.
pub const CONFIG: u64 = 0x00;
/// Buffer size register offset.
pub const BUFFER_SIZE: u64 = 0x04;

/// Drop packets when the buffer is full.
pub const CONFIG_DROP: u32 = 1 << 0;
/// Soft reset.
pub const CONFIG_RESET: u32 = 1 << 31;

#[derive(Debug)]
struct Pbm {
    base: u64,
}

impl ComponentBehavior for Pbm {
    fn reset(&mut self, ctx: &mut ComponentContext<'_>) -> Result<()> {
        let mut config = Grw::new(GrwAddress(self.base + CONFIG), Direct);
        config.modify(ctx.bus(), 0, CONFIG_RESET);
        debug!(base = self.base, "pbm reset");
        config.take_last_error().map_or(Ok(()), |e| Err(e.into()))
    }

    fn set_defaults(&mut self, ctx: &mut ComponentContext<'_>) -> Result<()> {
        ctx.set(AttributeCode::Drop, &AttributeValue::Boolean(true))
    }

    fn update_register_base(&mut self, ctx: &mut ComponentContext<'_>, entry: &RegisterEntry) -> Result<()> {
        self.base = entry.base;
        if let Some(grw) = ctx.grw(AttributeCode::Drop) {
            let _ = grw.set_address(GrwAddress(entry.base + CONFIG));
        }
        if let Some(grw) = ctx.grw(AttributeCode::BufferSize) {
            let _ = grw.set_address(GrwAddress(entry.base + BUFFER_SIZE));
        }
        Ok(())
    }
}

/// Builds the packet buffer manager from its table entry.
pub fn build(ctx: &mut BuildContext<'_>, entry: RegisterEntry, index: u32) -> Component {
    let reg = |off: u64| Grw::new(GrwAddress(entry.base + off), Direct);
    let mut a = Assembler::new(ctx.ids, ComponentCode::PacketBufferManager, index, Pbm { base: entry.base })
        .module(entry, index);
    a.config(AttributeCode::Drop, ValueType::Boolean, RegisterBit::new(CONFIG_DROP), reg(CONFIG));
    a.status(AttributeCode::BufferSize, ValueType::Uint32, RegisterWord, reg(BUFFER_SIZE));
    a.finish()
}
