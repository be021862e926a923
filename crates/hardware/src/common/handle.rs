//! Checksum-guarded handles.
//!
//! Objects that cross into raw-pointer territory (mapped register windows and
//! the GRW core that addresses them) keep an integrity seal:
//! 1. **Magic:** A per-type constant identifying what the slot holds.
//! 2. **Checksum:** A digest over every guarded field except magic and checksum.
//! 3. **Reseal on mutation:** Every mutator goes through [`Sealed::update`], which recomputes the digest.
//!
//! A seal that does not verify means the object was torn down or scribbled
//! over; accessors then hand back `None` and callers return their sentinel
//! instead of dereferencing further.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Value types that can live inside a [`Sealed`] slot.
pub trait Sealable: Hash {
    /// Magic constant stored alongside the value.
    const MAGIC: u32;
}

/// Magic value written into a seal when its owner is disposed.
pub const DISPOSED_MAGIC: u32 = 0xDEAD_0BAD;

/// A value guarded by a magic constant and a checksum.
#[derive(Clone, Debug)]
pub struct Sealed<T: Sealable> {
    magic: u32,
    value: T,
    checksum: u64,
}

fn digest<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

impl<T: Sealable> Sealed<T> {
    /// Seals a value.
    pub fn new(value: T) -> Self {
        let checksum = digest(&value);
        Self {
            magic: T::MAGIC,
            value,
            checksum,
        }
    }

    /// Returns `true` if the magic matches and the stored checksum verifies.
    pub fn is_valid(&self) -> bool {
        self.magic == T::MAGIC && digest(&self.value) == self.checksum
    }

    /// Returns the guarded value if the seal verifies.
    pub fn get(&self) -> Option<&T> {
        if self.is_valid() { Some(&self.value) } else { None }
    }

    /// Mutates the guarded value and reseals it.
    ///
    /// Returns `None` without running `f` if the seal is already broken.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        if !self.is_valid() {
            return None;
        }
        let out = f(&mut self.value);
        self.checksum = digest(&self.value);
        Some(out)
    }

    /// Mutable access that skips resealing; lets tests scribble over a guarded field.
    #[cfg(test)]
    pub(crate) fn value_mut_unsealed(&mut self) -> &mut T {
        &mut self.value
    }

    /// Breaks the seal so every later access fails validation.
    pub fn invalidate(&mut self) {
        self.magic = DISPOSED_MAGIC;
    }
}
