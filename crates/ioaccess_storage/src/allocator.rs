//! Allocators backing [`RawMemory`](crate::RawMemory).

use crate::error::{StorageError, StorageResult};
use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;

/// Alignment of blocks handed out by [`SystemAllocator`].
pub const RAW_ALIGNMENT: usize = 16;

/// Source of unmanaged memory for raw backends.
///
/// Implementations only hand out and take back blocks. Zero-filling,
/// slicing and free-once bookkeeping happen in [`RawMemory`](crate::RawMemory).
pub trait RawAllocator: Send + Sync + fmt::Debug {
    /// Allocates a block of at least `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if no memory is available.
    fn allocate(&self, size: usize) -> StorageResult<NonNull<u8>>;

    /// Returns a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`allocate`](Self::allocate) on this allocator
    /// with the same `size`, and must not have been freed already.
    unsafe fn free(&self, ptr: NonNull<u8>, size: usize);
}

/// The global Rust allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl SystemAllocator {
    fn layout(size: usize) -> StorageResult<Layout> {
        // zero-size blocks still get a real allocation so every block has a
        // unique address to free
        Layout::from_size_align(size.max(1), RAW_ALIGNMENT).map_err(|_| StorageError::InvalidLayout {
            size,
            alignment: RAW_ALIGNMENT,
        })
    }
}

impl RawAllocator for SystemAllocator {
    fn allocate(&self, size: usize) -> StorageResult<NonNull<u8>> {
        let layout = Self::layout(size)?;
        // SAFETY: layout size is at least one byte.
        let ptr = unsafe { alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(StorageError::AllocationFailed { size })
    }

    unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
        if let Ok(layout) = Self::layout(size) {
            // SAFETY: caller guarantees ptr came from allocate(size), which
            // used this same layout.
            unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_allocator_roundtrip() {
        let allocator = SystemAllocator;
        let ptr = allocator.allocate(64).unwrap();
        assert_eq!(ptr.as_ptr() as usize % RAW_ALIGNMENT, 0);
        unsafe { allocator.free(ptr, 64) };
    }

    #[test]
    fn system_allocator_zero_size() {
        let allocator = SystemAllocator;
        let ptr = allocator.allocate(0).unwrap();
        unsafe { allocator.free(ptr, 0) };
    }

    #[test]
    fn system_allocator_rejects_overflow() {
        let result = SystemAllocator.allocate(usize::MAX);
        assert!(matches!(result, Err(StorageError::InvalidLayout { .. })));
    }
}
