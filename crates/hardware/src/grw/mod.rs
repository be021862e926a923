//! Generic Read-Write (GRW) register accessors.
//!
//! A GRW is one logical register behind one transport. It provides:
//! 1. **Uniform contract:** `read() -> u32` / `write(u32)` whatever the transport.
//! 2. **Sealed core:** Address, bit policy and attribute back-reference live in a checksum seal.
//! 3. **Latched errors:** Failures land in a last-error slot that callers poll and clear.
//! 4. **Bit helpers:** Masked field access and read-modify-write honoring the on-operation policy.
//!
//! Transports are [`RegisterAccess`] implementations: [`Direct`] window access,
//! [`RawSmbus`] and [`DrbSmbus`] controllers, [`Mdio`] masters, [`RomRead`] and
//! [`CachedStatus`].

/// Cached-status reads from a component latch.
pub mod cached;

/// Direct window access.
pub mod direct;

/// MDIO masters (MAC-embedded and IOM-tunnelled).
pub mod mdio;

/// Bounded polling helper.
pub mod poll;

/// ROM trailer reads.
pub mod rom;

/// SMBus controllers (raw two-wire and DRB-mediated).
pub mod smbus;

use std::fmt;

use tracing::debug;

use crate::card::interconnect::Bus;
use crate::common::{GrwAddress, GrwError, Sealable, Sealed};
use crate::model::AttributeId;

pub use cached::{CachedStatus, StatusLatch};
pub use direct::Direct;
pub use mdio::{Mdio, MdioFamily};
pub use poll::{PollOutcome, poll_until};
pub use rom::{RomImage, RomRead};
pub use smbus::{DrbSmbus, RawSmbus};

/// A transport that can service GRW reads and writes.
///
/// Implementations never block indefinitely: every wait is bounded by the
/// budgets in the bus configuration, and failure is reported through the
/// returned `GrwError`.
pub trait RegisterAccess: Send + fmt::Debug {
    /// Reads the register at `addr`.
    fn read(&mut self, bus: &mut Bus, addr: GrwAddress) -> Result<u32, GrwError>;
    /// Writes `val` to the register at `addr`.
    fn write(&mut self, bus: &mut Bus, addr: GrwAddress, val: u32) -> Result<(), GrwError>;
}

/// How bit helpers interpret "on".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OnOperation {
    /// "On" sets the masked bits.
    #[default]
    SetBit,
    /// "On" clears the masked bits (active-low hardware).
    ClearBit,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
struct GrwCore {
    address: GrwAddress,
    on_operation: OnOperation,
    attribute: Option<AttributeId>,
}

impl Sealable for GrwCore {
    const MAGIC: u32 = 0x4752_5721;
}

/// One logical register bound to a transport.
#[derive(Debug)]
pub struct Grw {
    core: Sealed<GrwCore>,
    access: Option<Box<dyn RegisterAccess>>,
    last_error: Option<GrwError>,
}

impl Grw {
    /// Binds `address` to a transport.
    pub fn new(address: impl Into<GrwAddress>, access: impl RegisterAccess + 'static) -> Self {
        Self::with_access(address.into(), Some(Box::new(access)))
    }

    /// Creates a GRW with no transport; reads return 0 and writes are dropped.
    pub fn unbound(address: impl Into<GrwAddress>) -> Self {
        Self::with_access(address.into(), None)
    }

    fn with_access(address: GrwAddress, access: Option<Box<dyn RegisterAccess>>) -> Self {
        Self {
            core: Sealed::new(GrwCore {
                address,
                on_operation: OnOperation::SetBit,
                attribute: None,
            }),
            access,
            last_error: None,
        }
    }

    /// Sets the on-operation policy at construction.
    pub fn with_on_operation(mut self, op: OnOperation) -> Self {
        let _ = self.set_on_operation(op);
        self
    }

    /// Returns `true` while the GRW's seal verifies.
    pub fn is_valid(&self) -> bool {
        self.core.is_valid()
    }

    /// Returns the address, or `None` if the GRW is invalid.
    pub fn address(&self) -> Option<GrwAddress> {
        self.core.get().map(|c| c.address)
    }

    /// Rebinds the address; returns `false` if the GRW is invalid.
    pub fn set_address(&mut self, address: impl Into<GrwAddress>) -> bool {
        let address = address.into();
        self.core.update(|c| c.address = address).is_some()
    }

    /// Returns the on-operation policy, or `None` if the GRW is invalid.
    pub fn on_operation(&self) -> Option<OnOperation> {
        self.core.get().map(|c| c.on_operation)
    }

    /// Changes the on-operation policy; returns `false` if the GRW is invalid.
    pub fn set_on_operation(&mut self, op: OnOperation) -> bool {
        self.core.update(|c| c.on_operation = op).is_some()
    }

    /// Returns the attribute this GRW serves, if bound.
    pub fn attribute(&self) -> Option<AttributeId> {
        self.core.get().and_then(|c| c.attribute)
    }

    /// Records the attribute this GRW serves; returns `false` if the GRW is invalid.
    pub fn bind_attribute(&mut self, id: AttributeId) -> bool {
        self.core.update(|c| c.attribute = Some(id)).is_some()
    }

    /// Returns `true` if a transport is bound.
    pub fn is_bound(&self) -> bool {
        self.access.is_some()
    }

    /// Swaps the transport; returns `false` if the GRW is invalid.
    pub fn set_access(&mut self, access: impl RegisterAccess + 'static) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.access = Some(Box::new(access));
        true
    }

    /// Reads the register.
    ///
    /// On failure the error is latched and 0 is returned.
    pub fn read(&mut self, bus: &mut Bus) -> u32 {
        let Some(core) = self.core.get().copied() else {
            self.last_error = Some(GrwError::ReadError);
            return 0;
        };
        let Some(access) = self.access.as_mut() else {
            self.last_error = Some(GrwError::ReadError);
            return 0;
        };
        match access.read(bus, core.address) {
            Ok(v) => v,
            Err(e) => {
                debug!(address = core.address.val(), error = %e, "grw read failed");
                self.last_error = Some(e);
                0
            }
        }
    }

    /// Writes the register.
    ///
    /// On failure the error is latched.
    pub fn write(&mut self, bus: &mut Bus, val: u32) {
        let Some(core) = self.core.get().copied() else {
            self.last_error = Some(GrwError::WriteError);
            return;
        };
        let Some(access) = self.access.as_mut() else {
            self.last_error = Some(GrwError::WriteError);
            return;
        };
        if let Err(e) = access.write(bus, core.address, val) {
            debug!(address = core.address.val(), val, error = %e, "grw write failed");
            self.last_error = Some(e);
        }
    }

    /// Returns the latched error without clearing it.
    pub fn last_error(&self) -> Option<GrwError> {
        self.last_error
    }

    /// Returns and clears the latched error.
    pub fn take_last_error(&mut self) -> Option<GrwError> {
        self.last_error.take()
    }

    /// Reads the register and clears the masked bits, then sets `set`.
    ///
    /// The write is skipped if the read fails; the failure is latched as a write error.
    pub fn modify(&mut self, bus: &mut Bus, clear: u32, set: u32) {
        let before = self.last_error.take();
        let current = self.read(bus);
        if self.last_error.is_some() {
            self.last_error = Some(GrwError::WriteError);
            return;
        }
        self.last_error = before;
        self.write(bus, (current & !clear) | set);
    }

    /// Returns whether the masked bits read as "on" under the current policy.
    pub fn read_bit(&mut self, bus: &mut Bus, mask: u32) -> bool {
        let raw = self.read(bus) & mask != 0;
        match self.on_operation() {
            Some(OnOperation::ClearBit) => !raw,
            _ => raw,
        }
    }

    /// Turns the masked bits on or off under the current policy.
    pub fn write_bit(&mut self, bus: &mut Bus, mask: u32, on: bool) {
        let set = match self.on_operation() {
            Some(OnOperation::ClearBit) => !on,
            _ => on,
        };
        if set {
            self.modify(bus, 0, mask);
        } else {
            self.modify(bus, mask, 0);
        }
    }

    /// Reads the field selected by `mask`, shifted down to bit 0.
    pub fn read_field(&mut self, bus: &mut Bus, mask: u32) -> u32 {
        if mask == 0 {
            return 0;
        }
        (self.read(bus) & mask) >> mask.trailing_zeros()
    }

    /// Writes `value` into the field selected by `mask`.
    pub fn write_field(&mut self, bus: &mut Bus, mask: u32, value: u32) {
        if mask == 0 {
            return;
        }
        let shifted = (value << mask.trailing_zeros()) & mask;
        self.modify(bus, mask, shifted);
    }

    /// Tears the GRW down; later accesses fail validation.
    pub fn dispose(&mut self) {
        self.core.invalidate();
        self.access = None;
    }
}
