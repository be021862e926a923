//! Memory-mapped register window.
//!
//! This module wraps a raw mapping of 32-bit registers. It supports:
//! 1. **Anonymous windows:** `mmap`-backed zeroed memory for offline cards.
//! 2. **Borrowed windows:** A BAR mapped by the caller, adopted through an unsafe constructor.
//! 3. **Volatile access:** Every load and store goes through `read_volatile`/`write_volatile`.
//!
//! The base pointer and length are held in a [`Sealed`] slot; an access is only
//! performed after the seal verifies and the offset is in range and aligned.

use std::io;
use std::ptr;

use tracing::warn;

use crate::card::traits::RegisterSpace;
use crate::common::{DagError, Result, Sealable, Sealed};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
struct WindowHandle {
    base: usize,
    len: usize,
}

impl Sealable for WindowHandle {
    const MAGIC: u32 = 0x4D4D_494F;
}

/// A mapped register window.
#[derive(Debug)]
pub struct MappedRegion {
    handle: Sealed<WindowHandle>,
    owned: bool,
    name: String,
}

impl MappedRegion {
    /// Maps a zeroed anonymous window of `len` bytes.
    ///
    /// On Unix this uses `mmap`; elsewhere a heap allocation.
    pub fn anonymous(len: usize) -> Result<Self> {
        if len == 0 || len % 4 != 0 {
            return Err(DagError::InvalidParameter(format!(
                "register window size {len} must be a non-zero multiple of 4"
            )));
        }

        #[cfg(unix)]
        let base = {
            // SAFETY: anonymous private mapping with no address hint; the result is
            // checked against MAP_FAILED before use.
            let ptr = unsafe {
                libc::mmap(
                    ptr::null_mut(),
                    len,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(DagError::General(format!(
                    "cannot map {len} byte register window: {}",
                    io::Error::last_os_error()
                )));
            }
            ptr as usize
        };

        #[cfg(not(unix))]
        let base = {
            let words = vec![0u32; len / 4].into_boxed_slice();
            Box::into_raw(words) as *mut u32 as usize
        };

        Ok(Self {
            handle: Sealed::new(WindowHandle { base, len }),
            owned: true,
            name: "offline".to_string(),
        })
    }

    /// Adopts a window mapped elsewhere (e.g., a device BAR).
    ///
    /// # Safety
    ///
    /// `base` must point to `len` bytes of readable and writable memory,
    /// 4-byte aligned, that stays mapped for the lifetime of the returned value.
    pub unsafe fn from_raw(base: *mut u8, len: usize, name: &str) -> Self {
        Self {
            handle: Sealed::new(WindowHandle {
                base: base as usize,
                len,
            }),
            owned: false,
            name: name.to_string(),
        }
    }

    /// Returns `true` while the window handle verifies.
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    fn word_ptr(&self, offset: u64) -> Option<*mut u32> {
        let handle = self.handle.get()?;
        let offset = usize::try_from(offset).ok()?;
        if offset % 4 != 0 || offset.checked_add(4)? > handle.len {
            return None;
        }
        Some((handle.base + offset) as *mut u32)
    }
}

impl RegisterSpace for MappedRegion {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.handle.get().map_or(0, |h| h.len as u64)
    }

    fn read_u32(&mut self, offset: u64) -> u32 {
        match self.word_ptr(offset) {
            // SAFETY: word_ptr checked the seal, alignment and bounds against the
            // mapping described by the handle.
            Some(p) => unsafe { ptr::read_volatile(p) },
            None => {
                warn!(window = %self.name, offset, "rejected register read");
                0
            }
        }
    }

    fn write_u32(&mut self, offset: u64, val: u32) {
        match self.word_ptr(offset) {
            // SAFETY: as in read_u32.
            Some(p) => unsafe { ptr::write_volatile(p, val) },
            None => warn!(window = %self.name, offset, val, "rejected register write"),
        }
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        if self.owned {
            if let Some(h) = self.handle.get().copied() {
                #[cfg(unix)]
                // SAFETY: the mapping was created by `anonymous` with exactly this base and length.
                unsafe {
                    let _ = libc::munmap(h.base as *mut libc::c_void, h.len);
                }
                #[cfg(not(unix))]
                // SAFETY: the allocation was leaked from a boxed slice of len / 4 words.
                unsafe {
                    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(h.base as *mut u32, h.len / 4)));
                }
            }
        }
        self.handle.invalidate();
    }
}
