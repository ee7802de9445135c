//! Page-backed pixel memory shared between a `SurfaceTable` entry and
//! any live client mappings of it.
//!
//! The region is a real OS-backed anonymous mapping (`memmap2`), not a
//! plain heap buffer: pages come back zero-filled by the OS, exactly
//! matching the "zero-filled at creation" invariant, and the handle is
//! cheap to share by reference the same way a kernel would share a
//! physical page between an owning table and any live mappings of it.

use std::io;
use std::sync::{Arc, Mutex};

use memmap2::MmapMut;

/// A single pixel buffer, owned by exactly one `SurfaceTable` entry
/// and shared by reference with zero or more live client mappings.
/// The table's own reference and each mapping's reference are
/// symmetric: the region is freed only once every `Arc` to it drops,
/// which may happen after the table entry itself has been destroyed.
pub struct SurfaceMemory {
    mmap: Mutex<MmapMut>,
    len: usize,
}

impl std::fmt::Debug for SurfaceMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceMemory")
            .field("len", &self.len)
            .finish()
    }
}

impl SurfaceMemory {
    /// Allocate a new zero-filled region of exactly `len` bytes.
    pub fn new(len: usize) -> io::Result<Arc<Self>> {
        let mmap = MmapMut::map_anon(len.max(1))?;
        Ok(Arc::new(Self {
            mmap: Mutex::new(mmap),
            len,
        }))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy the whole region out.
    pub fn to_vec(&self) -> Vec<u8> {
        self.mmap.lock().unwrap()[..self.len].to_vec()
    }

    /// Overwrite the whole region from `src`. `src.len()` must equal
    /// this region's length.
    pub fn copy_from_slice(&self, src: &[u8]) {
        assert_eq!(src.len(), self.len, "surface memory size mismatch");
        self.mmap.lock().unwrap()[..self.len].copy_from_slice(src);
    }

    /// Run `f` with shared read access to the region.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let guard = self.mmap.lock().unwrap();
        f(&guard[..self.len])
    }

    /// Run `f` with mutable access to the region.
    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let mut guard = self.mmap.lock().unwrap();
        f(&mut guard[..self.len])
    }
}
