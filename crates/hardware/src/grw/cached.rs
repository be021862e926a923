//! Cached-status reads.
//!
//! Some status registers clear on read or must be sampled once and interpreted
//! by several attributes. The owning component samples the register into a
//! [`StatusLatch`]; GRWs bound to [`CachedStatus`] then read the latched word
//! without issuing a transaction.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::card::interconnect::Bus;
use crate::common::{GrwAddress, GrwError};
use crate::grw::RegisterAccess;

/// Shared latched status word.
#[derive(Clone, Debug, Default)]
pub struct StatusLatch(Arc<AtomicU32>);

impl StatusLatch {
    /// Creates a latch holding zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the latched word.
    pub fn load(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Replaces the latched word.
    pub fn store(&self, val: u32) {
        self.0.store(val, Ordering::Relaxed);
    }
}

/// Reads a component's latched status word.
#[derive(Clone, Debug)]
pub struct CachedStatus {
    latch: StatusLatch,
}

impl CachedStatus {
    /// Creates an accessor over `latch`.
    pub fn new(latch: StatusLatch) -> Self {
        Self { latch }
    }
}

impl RegisterAccess for CachedStatus {
    fn read(&mut self, _bus: &mut Bus, _addr: GrwAddress) -> Result<u32, GrwError> {
        Ok(self.latch.load())
    }

    fn write(&mut self, _bus: &mut Bus, _addr: GrwAddress, _val: u32) -> Result<(), GrwError> {
        Err(GrwError::WriteError)
    }
}
