//! Direct register window access.
//!
//! The GRW address is a byte offset into the card's mapped window; the access
//! is a single volatile 32-bit load or store.

use crate::card::interconnect::Bus;
use crate::common::{GrwAddress, GrwError};
use crate::grw::RegisterAccess;

/// Direct memory-mapped register access.
#[derive(Clone, Copy, Debug, Default)]
pub struct Direct;

fn in_window(bus: &Bus, addr: GrwAddress) -> bool {
    addr.offset() % 4 == 0 && addr.offset().saturating_add(4) <= bus.window_size()
}

impl RegisterAccess for Direct {
    fn read(&mut self, bus: &mut Bus, addr: GrwAddress) -> Result<u32, GrwError> {
        if !in_window(bus, addr) {
            return Err(GrwError::ReadError);
        }
        Ok(bus.read_u32(addr.offset()))
    }

    fn write(&mut self, bus: &mut Bus, addr: GrwAddress, val: u32) -> Result<(), GrwError> {
        if !in_window(bus, addr) {
            return Err(GrwError::WriteError);
        }
        bus.write_u32(addr.offset(), val);
        Ok(())
    }
}
