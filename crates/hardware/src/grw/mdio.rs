//! MDIO (clause 45) masters.
//!
//! Two master families share the GRW contract and the packed [`MdioAddress`]:
//! 1. **MAC-embedded (`MdioFamily::Mac`):** Command and data registers inside
//!    the MAC block, written directly.
//! 2. **IOM-tunnelled (`MdioFamily::Iom`):** The PHY bus hangs off an I/O module
//!    register pair; every word goes through a transient [`Direct`] GRW built for
//!    that single access.
//!
//! A write pushes the address word, waits the configured settle time, then
//! pushes the value word with the write strobe. A read pushes the address word,
//! waits, issues the read command and polls the data-valid bit a small fixed
//! number of times before giving up with 0.
//!
//! # MAC family registers
//!
//! * `+0x0`: Command. `[15:0]` register/value, `[20:16]` MMD, `[25:21]` device,
//!   `[29:28]` op (0 address, 1 write, 3 read), `[31]` write strobe.
//! * `+0x4`: Data. `[15:0]` value, `[31]` data valid.
//!
//! # IOM family registers
//!
//! * `+0x0`: Command. `[15:0]` register/value, `[20:16]` MMD, `[25:21]` device,
//!   `[26]` address cycle, `[27]` read, `[30]` write strobe.
//! * `+0x4`: Data. `[15:0]` value, `[16]` data valid.

use tracing::warn;

use crate::card::interconnect::Bus;
use crate::common::{GrwAddress, GrwError, MdioAddress};
use crate::grw::direct::Direct;
use crate::grw::poll::poll_until;
use crate::grw::{Grw, RegisterAccess};

const CMD: u64 = 0x0;
const DATA: u64 = 0x4;

/// MDIO master family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MdioFamily {
    /// Master embedded in a MAC block.
    Mac,
    /// Master tunnelled through an I/O module register pair.
    Iom,
}

impl MdioFamily {
    fn target(self, a: &MdioAddress) -> u32 {
        (u32::from(a.mmd & 0x1F) << 16) | (u32::from(a.device & 0x1F) << 21)
    }

    fn address_word(self, a: &MdioAddress) -> u32 {
        let base = self.target(a) | u32::from(a.register);
        match self {
            Self::Mac => base,
            Self::Iom => base | (1 << 26),
        }
    }

    fn write_word(self, a: &MdioAddress, val: u16) -> u32 {
        let base = self.target(a) | u32::from(val);
        match self {
            Self::Mac => base | (1 << 28) | (1 << 31),
            Self::Iom => base | (1 << 30),
        }
    }

    fn read_word(self, a: &MdioAddress) -> u32 {
        match self {
            Self::Mac => self.target(a) | (3 << 28),
            Self::Iom => self.target(a) | (1 << 27),
        }
    }

    fn data_valid(self) -> u32 {
        match self {
            Self::Mac => 1 << 31,
            Self::Iom => 1 << 16,
        }
    }
}

/// MDIO master at `base` in the register window.
#[derive(Clone, Copy, Debug)]
pub struct Mdio {
    family: MdioFamily,
    base: u64,
}

impl Mdio {
    /// Creates an accessor for a master block.
    pub const fn new(family: MdioFamily, base: u64) -> Self {
        Self { family, base }
    }

    fn push(&self, bus: &mut Bus, word: u32) -> bool {
        match self.family {
            MdioFamily::Mac => {
                bus.write_u32(self.base + CMD, word);
                true
            }
            MdioFamily::Iom => {
                let mut reg = Grw::new(GrwAddress(self.base + CMD), Direct);
                reg.write(bus, word);
                reg.take_last_error().is_none()
            }
        }
    }

    fn pull(&self, bus: &mut Bus) -> Option<u32> {
        match self.family {
            MdioFamily::Mac => Some(bus.read_u32(self.base + DATA)),
            MdioFamily::Iom => {
                let mut reg = Grw::new(GrwAddress(self.base + DATA), Direct);
                let v = reg.read(bus);
                reg.take_last_error().is_none().then_some(v)
            }
        }
    }
}

impl RegisterAccess for Mdio {
    fn read(&mut self, bus: &mut Bus, addr: GrwAddress) -> Result<u32, GrwError> {
        let a = MdioAddress::unpack(addr);
        if !self.push(bus, self.family.address_word(&a)) {
            return Err(GrwError::ReadError);
        }
        let settle = bus.config().mdio.settle();
        bus.sleep(settle);
        if !self.push(bus, self.family.read_word(&a)) {
            return Err(GrwError::ReadError);
        }

        let attempts = bus.config().mdio.data_valid_attempts;
        let valid = self.family.data_valid();
        let outcome = poll_until(bus, attempts, settle, |bus| {
            self.pull(bus).filter(|d| d & valid != 0)
        });
        match outcome.ready() {
            Some(d) => Ok(d & 0xFFFF),
            None => {
                warn!(device = a.device, mmd = a.mmd, register = a.register, "mdio data never valid");
                Err(GrwError::ReadError)
            }
        }
    }

    fn write(&mut self, bus: &mut Bus, addr: GrwAddress, val: u32) -> Result<(), GrwError> {
        let a = MdioAddress::unpack(addr);
        if !self.push(bus, self.family.address_word(&a)) {
            return Err(GrwError::WriteError);
        }
        let settle = bus.config().mdio.settle();
        bus.sleep(settle);
        if !self.push(bus, self.family.write_word(&a, val as u16)) {
            return Err(GrwError::WriteError);
        }
        Ok(())
    }
}
