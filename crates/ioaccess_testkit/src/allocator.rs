//! Allocation-tracking test double for raw memory.

use ioaccess_storage::{RawAllocator, StorageResult, SystemAllocator};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ptr::NonNull;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Default)]
struct Ledger {
    live: HashMap<usize, usize>,
    allocations: usize,
    frees: usize,
    invalid_frees: usize,
}

/// A [`RawAllocator`] that records every allocation and free.
///
/// Freeing a block twice, or freeing a block it never handed out, is
/// counted as an invalid free and never reaches the system allocator.
#[derive(Debug, Default)]
pub struct TrackingAllocator {
    ledger: Mutex<Ledger>,
}

impl TrackingAllocator {
    /// Creates a tracking allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shared tracking allocator, ready to hand to `Access::raw_with_allocator`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of blocks handed out.
    pub fn allocations(&self) -> usize {
        self.ledger.lock().allocations
    }

    /// Number of valid frees.
    pub fn frees(&self) -> usize {
        self.ledger.lock().frees
    }

    /// Number of double or foreign frees.
    pub fn invalid_frees(&self) -> usize {
        self.ledger.lock().invalid_frees
    }

    /// Number of blocks allocated and not yet freed.
    pub fn live(&self) -> usize {
        self.ledger.lock().live.len()
    }

    /// Bytes allocated and not yet freed.
    pub fn live_bytes(&self) -> usize {
        self.ledger.lock().live.values().sum()
    }

    /// Returns true if every block was freed exactly once.
    pub fn is_balanced(&self) -> bool {
        let ledger = self.ledger.lock();
        ledger.live.is_empty() && ledger.invalid_frees == 0 && ledger.allocations == ledger.frees
    }
}

impl RawAllocator for TrackingAllocator {
    fn allocate(&self, size: usize) -> StorageResult<NonNull<u8>> {
        let ptr = SystemAllocator.allocate(size)?;
        let mut ledger = self.ledger.lock();
        ledger.live.insert(ptr.as_ptr() as usize, size);
        ledger.allocations += 1;
        Ok(ptr)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
        let mut ledger = self.ledger.lock();
        match ledger.live.remove(&(ptr.as_ptr() as usize)) {
            Some(allocated) if allocated == size => {
                ledger.frees += 1;
                drop(ledger);
                // SAFETY: the ledger proves ptr came from SystemAllocator with
                // this size and has not been freed since.
                unsafe { SystemAllocator.free(ptr, size) };
            }
            Some(allocated) => {
                ledger.live.insert(ptr.as_ptr() as usize, allocated);
                ledger.invalid_frees += 1;
                warn!(allocated, size, "free with mismatched size");
            }
            None => {
                ledger.invalid_frees += 1;
                warn!(size, "double or foreign free");
            }
        }
    }
}
