//! SMBus controllers.
//!
//! Two controller flavors share the GRW contract and the packed
//! [`SmbusAddress`]:
//! 1. **Raw two-wire (`RawSmbus`):** One control word kicks the transaction; a
//!    status word reports ready, error bits and the result byte.
//! 2. **DRB-mediated (`DrbSmbus`):** Separate address, data and command/status
//!    registers on the card's internal register bus; completion is signalled by
//!    a busy bit dropping.
//!
//! Both wait on completion with [`poll_until`] using the SMBus budget from the
//! card configuration and never block past it.
//!
//! # Raw controller registers (per sub-bus, stride `0x10`)
//!
//! * `+0x0`: Control. `[7:0]` data, `[15:8]` device register, `[22:16]` device
//!   address, `[23]` read, `[27:24]` line, `[31]` start.
//! * `+0x4`: Status. `[7:0]` result, `[29]` arbitration lost, `[30]` NACK, `[31]` ready.
//!
//! # DRB controller registers (per sub-bus, stride `0x10`)
//!
//! * `+0x0`: Address. `[7:0]` device address << 1 | read, `[15:8]` device register, `[19:16]` line.
//! * `+0x4`: Data. `[7:0]` byte to write / byte read.
//! * `+0x8`: Command/status. Write `START`; read `[31]` busy, `[1]` error.

use tracing::warn;

use crate::card::interconnect::Bus;
use crate::common::{GrwAddress, GrwError, SmbusAddress};
use crate::grw::RegisterAccess;
use crate::grw::poll::{PollOutcome, poll_until};

/// Byte distance between consecutive controller instances.
pub const SUB_BUS_STRIDE: u64 = 0x10;

mod raw_regs {
    pub const CTRL: u64 = 0x0;
    pub const STATUS: u64 = 0x4;

    pub const CTRL_READ: u32 = 1 << 23;
    pub const CTRL_START: u32 = 1 << 31;

    pub const STATUS_READY: u32 = 1 << 31;
    pub const STATUS_NACK: u32 = 1 << 30;
    pub const STATUS_ARB_LOST: u32 = 1 << 29;
    pub const STATUS_ERR_MASK: u32 = STATUS_NACK | STATUS_ARB_LOST;
}

mod drb_regs {
    pub const ADDR: u64 = 0x0;
    pub const DATA: u64 = 0x4;
    pub const CMD: u64 = 0x8;

    pub const ADDR_READ: u32 = 1;
    pub const CMD_START: u32 = 1 << 0;

    pub const STATUS_BUSY: u32 = 1 << 31;
    pub const STATUS_ERROR: u32 = 1 << 1;
}

/// Raw two-wire SMBus controller at `base` in the register window.
#[derive(Clone, Copy, Debug)]
pub struct RawSmbus {
    base: u64,
}

impl RawSmbus {
    /// Creates an accessor for the controller block at `base`.
    pub const fn new(base: u64) -> Self {
        Self { base }
    }

    fn controller(&self, addr: &SmbusAddress) -> u64 {
        self.base + u64::from(addr.sub_bus) * SUB_BUS_STRIDE
    }

    fn control_word(addr: &SmbusAddress, data: u8, read: bool) -> u32 {
        let mut word = u32::from(data)
            | (u32::from(addr.device_register) << 8)
            | (u32::from(addr.device_address & 0x7F) << 16)
            | (u32::from(addr.line & 0xF) << 24)
            | raw_regs::CTRL_START;
        if read {
            word |= raw_regs::CTRL_READ;
        }
        word
    }

    fn wait_ready(bus: &mut Bus, status: u64) -> Option<u32> {
        let retries = bus.config().smbus.retries;
        let delay = bus.config().smbus.poll_delay();
        let outcome = poll_until(bus, retries, delay, |bus| {
            let s = bus.read_u32(status);
            (s & raw_regs::STATUS_READY != 0).then_some(s)
        });
        match outcome {
            PollOutcome::Ready { value, .. } => Some(value),
            PollOutcome::TimedOut { attempts } => {
                warn!(status, attempts, "smbus controller never became ready");
                None
            }
        }
    }
}

impl RegisterAccess for RawSmbus {
    fn read(&mut self, bus: &mut Bus, addr: GrwAddress) -> Result<u32, GrwError> {
        let a = SmbusAddress::unpack(addr);
        let ctl = self.controller(&a);
        bus.write_u32(ctl + raw_regs::CTRL, Self::control_word(&a, 0, true));
        let status = Self::wait_ready(bus, ctl + raw_regs::STATUS).ok_or(GrwError::ReadError)?;
        if status & raw_regs::STATUS_ERR_MASK != 0 {
            warn!(device = a.device_address, register = a.device_register, status, "smbus read error");
            return Err(GrwError::ReadError);
        }
        Ok(status & 0xFF)
    }

    fn write(&mut self, bus: &mut Bus, addr: GrwAddress, val: u32) -> Result<(), GrwError> {
        let a = SmbusAddress::unpack(addr);
        let ctl = self.controller(&a);
        bus.write_u32(ctl + raw_regs::CTRL, Self::control_word(&a, val as u8, false));
        let status = Self::wait_ready(bus, ctl + raw_regs::STATUS).ok_or(GrwError::WriteError)?;
        if status & raw_regs::STATUS_ERR_MASK != 0 {
            warn!(device = a.device_address, register = a.device_register, status, "smbus write error");
            return Err(GrwError::WriteError);
        }
        Ok(())
    }
}

/// SMBus controller reached through the card's internal register bus.
#[derive(Clone, Copy, Debug)]
pub struct DrbSmbus {
    base: u64,
}

impl DrbSmbus {
    /// Creates an accessor for the controller block at `base`.
    pub const fn new(base: u64) -> Self {
        Self { base }
    }

    fn controller(&self, addr: &SmbusAddress) -> u64 {
        self.base + u64::from(addr.sub_bus) * SUB_BUS_STRIDE
    }

    fn address_word(addr: &SmbusAddress, read: bool) -> u32 {
        let mut word = (u32::from(addr.device_address & 0x7F) << 1)
            | (u32::from(addr.device_register) << 8)
            | (u32::from(addr.line & 0xF) << 16);
        if read {
            word |= drb_regs::ADDR_READ;
        }
        word
    }

    /// Kicks the command and waits for the busy bit to drop.
    fn run(bus: &mut Bus, ctl: u64) -> Option<u32> {
        bus.write_u32(ctl + drb_regs::CMD, drb_regs::CMD_START);
        let retries = bus.config().smbus.retries;
        let delay = bus.config().smbus.poll_delay();
        let outcome = poll_until(bus, retries, delay, |bus| {
            let s = bus.read_u32(ctl + drb_regs::CMD);
            (s & drb_regs::STATUS_BUSY == 0).then_some(s)
        });
        match outcome {
            PollOutcome::Ready { value, .. } => Some(value),
            PollOutcome::TimedOut { attempts } => {
                warn!(controller = ctl, attempts, "drb smbus stayed busy");
                None
            }
        }
    }
}

impl RegisterAccess for DrbSmbus {
    fn read(&mut self, bus: &mut Bus, addr: GrwAddress) -> Result<u32, GrwError> {
        let a = SmbusAddress::unpack(addr);
        let ctl = self.controller(&a);
        bus.write_u32(ctl + drb_regs::ADDR, Self::address_word(&a, true));
        let status = Self::run(bus, ctl).ok_or(GrwError::ReadError)?;
        if status & drb_regs::STATUS_ERROR != 0 {
            return Err(GrwError::ReadError);
        }
        Ok(bus.read_u32(ctl + drb_regs::DATA) & 0xFF)
    }

    fn write(&mut self, bus: &mut Bus, addr: GrwAddress, val: u32) -> Result<(), GrwError> {
        let a = SmbusAddress::unpack(addr);
        let ctl = self.controller(&a);
        bus.write_u32(ctl + drb_regs::ADDR, Self::address_word(&a, false));
        bus.write_u32(ctl + drb_regs::DATA, val & 0xFF);
        let status = Self::run(bus, ctl).ok_or(GrwError::WriteError)?;
        if status & drb_regs::STATUS_ERROR != 0 {
            return Err(GrwError::WriteError);
        }
        Ok(())
    }
}
