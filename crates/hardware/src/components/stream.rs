//! Memory streams of the packet buffer manager.
//!
//! Even-numbered streams receive, odd-numbered streams transmit. Each has a
//! register block inside the buffer manager:
//!
//! * `+0x0`: `[15:0]` memory allotment in MiB.
//! * `+0x4`: Drop counter; writing 0 clears it.

use crate::common::{GrwAddress, Result};
use crate::components::{Assembler, BuildContext};
use crate::discovery::RegisterEntry;
use crate::grw::{Direct, Grw};
use crate::model::{
    AttributeCode, AttributeValue, Component, ComponentBehavior, ComponentCode, ComponentContext, RegisterField,
    RegisterWord, ValueType,
};

/// Offset of stream 0's block from the buffer manager base.
pub const STREAM_BLOCKS: u64 = 0x100;
/// Distance between consecutive stream blocks.
pub const STREAM_STRIDE: u64 = 0x10;
/// Memory allotment register.
pub const MEMORY: u64 = 0x0;
/// Drop counter register.
pub const DROP_COUNT: u64 = 0x4;

/// Returns the register block of stream `number` under a buffer manager at `pbm_base`.
pub const fn block(pbm_base: u64, number: u32) -> u64 {
    pbm_base + STREAM_BLOCKS + number as u64 * STREAM_STRIDE
}

/// Direction of a stream given its number.
pub const fn direction(number: u32) -> &'static str {
    if number % 2 == 0 { "rx" } else { "tx" }
}

#[derive(Debug)]
struct Stream {
    number: u32,
    base: u64,
}

impl ComponentBehavior for Stream {
    fn reset(&mut self, ctx: &mut ComponentContext<'_>) -> Result<()> {
        let mut drops = Grw::new(GrwAddress(self.base + DROP_COUNT), Direct);
        drops.write(ctx.bus(), 0);
        drops.take_last_error().map_or(Ok(()), |e| Err(e.into()))
    }

    fn update_register_base(&mut self, ctx: &mut ComponentContext<'_>, entry: &RegisterEntry) -> Result<()> {
        self.base = block(entry.base, self.number);
        if let Some(grw) = ctx.grw(AttributeCode::MemoryMegabytes) {
            let _ = grw.set_address(GrwAddress(self.base + MEMORY));
        }
        if let Some(grw) = ctx.grw(AttributeCode::DropCount) {
            let _ = grw.set_address(GrwAddress(self.base + DROP_COUNT));
        }
        Ok(())
    }
}

/// Builds stream `number` of the buffer manager described by `pbm`.
///
/// The stream records the buffer manager's entry as its module so register
/// base updates follow the buffer manager.
pub fn build(ctx: &mut BuildContext<'_>, pbm: RegisterEntry, pbm_index: u32, number: u32) -> Component {
    let base = block(pbm.base, number);
    let reg = |off: u64| Grw::new(GrwAddress(base + off), Direct);
    let mut a = Assembler::new(ctx.ids, ComponentCode::Stream, number, Stream { number, base }).module(pbm, pbm_index);
    a.constant(AttributeCode::StreamNumber, AttributeValue::Uint32(number));
    a.constant(AttributeCode::Direction, AttributeValue::String(direction(number).to_owned()));
    a.config(AttributeCode::MemoryMegabytes, ValueType::Uint32, RegisterField::new(0xFFFF), reg(MEMORY));
    a.status(AttributeCode::DropCount, ValueType::Uint32, RegisterWord, reg(DROP_COUNT));
    a.finish()
}
