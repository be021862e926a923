//! Transport traits for a card's register window.
//!
//! This module defines the seams to the outside world. It provides:
//! 1. **`RegisterSpace`:** 32-bit word access at window-relative byte offsets.
//! 2. **`Delay`:** The sleep primitive used between bounded polls.
//!
//! Opening the device file and mapping its BAR belong to the caller; whatever
//! they produce is handed to the card as a `RegisterSpace`.

use std::thread;
use std::time::Duration;

/// A window of 32-bit registers addressed by byte offset.
///
/// Implementors must be `Send` so a card can be moved to another thread; the
/// card itself is never shared between threads.
pub trait RegisterSpace: Send {
    /// Returns a short name for this window (e.g., `"BAR0"`, `"offline"`).
    fn name(&self) -> &str;
    /// Returns the window size in bytes.
    fn size(&self) -> u64;
    /// Reads the 32-bit word at `offset`.
    fn read_u32(&mut self, offset: u64) -> u32;
    /// Writes the 32-bit word at `offset`.
    fn write_u32(&mut self, offset: u64, val: u32);
}

/// Sleep primitive used by polling loops.
pub trait Delay: Send {
    /// Blocks the calling thread for `duration`.
    fn delay(&self, duration: Duration);
}

/// Delay backed by `std::thread::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleep;

impl Delay for ThreadSleep {
    fn delay(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Delay that returns immediately; for offline cards and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay(&self, _duration: Duration) {}
}
