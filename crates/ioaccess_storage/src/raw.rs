//! Raw pointer memory backend.
//!
//! A [`RawMemory`] owns one block from a [`RawAllocator`]. Slices are views
//! onto the owner's block: they hold a reference back to the allocation but
//! never free it. Freeing a view marks it and every view sliced from it as
//! freed; freeing the owner also returns the block to the allocator, exactly
//! once. Dropping an owner that was never freed frees it.
//!
//! The `_unchecked` accessors skip bounds validation and are the expert
//! path. Even they refuse to touch a block that has been freed.

use crate::allocator::{RawAllocator, SystemAllocator};
use crate::backend::{BackendKind, StorageBackend};
use crate::error::{StorageError, StorageResult};
use crate::region;
use ioaccess_codec::{ByteOrder, Primitive};
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// One allocated block. `None` is the freed sentinel.
#[derive(Debug)]
struct RawAllocation {
    address: RwLock<Option<NonNull<u8>>>,
    size: usize,
    allocator: Arc<dyn RawAllocator>,
}

// SAFETY: the block is plain bytes and every access goes through the
// address lock, which serializes writers against readers.
unsafe impl Send for RawAllocation {}
// SAFETY: see above.
unsafe impl Sync for RawAllocation {}

impl RawAllocation {
    /// Returns the block to its allocator. False if it was already returned.
    fn release(&self) -> bool {
        let Some(ptr) = self.address.write().take() else {
            return false;
        };
        // SAFETY: ptr came from this allocator with this size, and taking it
        // out of the lock guarantees it is freed only once.
        unsafe { self.allocator.free(ptr, self.size) };
        true
    }
}

/// Freed flag of one view, plus the views sliced from it.
#[derive(Debug, Default)]
struct SliceNode {
    freed: AtomicBool,
    children: Mutex<Vec<Weak<SliceNode>>>,
}

impl SliceNode {
    fn is_freed(&self) -> bool {
        self.freed.load(Ordering::Acquire)
    }

    fn track(&self, child: &Arc<SliceNode>) -> StorageResult<()> {
        let mut children = self.children.lock();
        if self.is_freed() {
            return Err(StorageError::Freed);
        }
        children.retain(|c| c.strong_count() > 0);
        children.push(Arc::downgrade(child));
        Ok(())
    }

    /// Marks this node and all live descendants freed. Returns how many
    /// descendants were newly marked.
    fn mark_freed(&self) -> usize {
        self.freed.store(true, Ordering::Release);
        let children = std::mem::take(&mut *self.children.lock());
        children
            .iter()
            .filter_map(Weak::upgrade)
            .map(|child| {
                if child.is_freed() {
                    child.mark_freed()
                } else {
                    1 + child.mark_freed()
                }
            })
            .sum()
    }
}

/// A window onto a raw memory block.
///
/// # Example
///
/// ```rust
/// use ioaccess_storage::RawMemory;
///
/// let mut memory = RawMemory::allocate(16).unwrap();
/// let mut view = memory.slice_raw(8, 8).unwrap();
/// view.set_value(0, 42u64).unwrap();
///
/// memory.free();
/// assert!(view.is_freed());
/// ```
#[derive(Debug)]
pub struct RawMemory {
    allocation: Arc<RawAllocation>,
    node: Arc<SliceNode>,
    offset: usize,
    size: usize,
    cursor: usize,
    order: ByteOrder,
    owner: bool,
}

impl RawMemory {
    /// Allocates `size` zeroed bytes from the global allocator.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub fn allocate(size: usize) -> StorageResult<Self> {
        Self::allocate_with(size, Arc::new(SystemAllocator))
    }

    /// Allocates `size` zeroed bytes from `allocator`.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocator fails.
    pub fn allocate_with(size: usize, allocator: Arc<dyn RawAllocator>) -> StorageResult<Self> {
        let ptr = allocator.allocate(size)?;
        // SAFETY: the allocator handed out at least size writable bytes.
        unsafe { region::fill(ptr.as_ptr(), size, 0) };

        debug!(size, address = ptr.as_ptr() as usize, "allocated raw memory");

        Ok(Self {
            allocation: Arc::new(RawAllocation {
                address: RwLock::new(Some(ptr)),
                size,
                allocator,
            }),
            node: Arc::new(SliceNode::default()),
            offset: 0,
            size,
            cursor: 0,
            order: ByteOrder::native(),
            owner: true,
        })
    }

    /// Returns the size of this window in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the sequential position within the window.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the byte order used by the typed accessors.
    #[must_use]
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Sets the byte order used by the typed accessors.
    pub fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// Returns true if this window owns the allocation.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// Returns true once this window, or a window it was sliced from, has been freed.
    #[must_use]
    pub fn is_freed(&self) -> bool {
        self.node.is_freed() || self.allocation.address.read().is_none()
    }

    /// Returns the address of the first byte of this window, or `None` once freed.
    #[must_use]
    pub fn address(&self) -> Option<usize> {
        if self.node.is_freed() {
            return None;
        }
        let base = *self.allocation.address.read();
        base.map(|base| base.as_ptr() as usize + self.offset)
    }

    /// Frees this window.
    ///
    /// Every window sliced from this one, directly or transitively, is marked
    /// freed. The owner also returns the block to its allocator. Freeing an
    /// already freed window does nothing.
    pub fn free(&mut self) {
        if self.node.is_freed() {
            return;
        }
        let cascaded = self.node.mark_freed();
        if self.owner {
            if self.allocation.release() {
                debug!(size = self.size, cascaded, "freed raw memory");
            }
        } else {
            trace!(offset = self.offset, size = self.size, cascaded, "freed raw slice");
        }
    }

    /// Creates a view over `len` bytes at `index`, tracked by this window.
    ///
    /// The view starts at position 0, inherits the byte order, and never
    /// frees the block itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is outside this window or it has been freed.
    pub fn slice_raw(&self, index: u64, len: u64) -> StorageResult<Self> {
        let len = usize::try_from(len).map_err(|_| StorageError::out_of_range(index, 0, self.size))?;
        let offset = self.span(index, len)?;
        let node = Arc::new(SliceNode::default());
        self.node.track(&node)?;
        trace!(offset, len, "sliced raw memory");
        Ok(Self {
            allocation: Arc::clone(&self.allocation),
            node,
            offset,
            size: len,
            cursor: 0,
            order: self.order,
            owner: false,
        })
    }

    fn span(&self, index: u64, len: usize) -> StorageResult<usize> {
        usize::try_from(index)
            .ok()
            .filter(|begin| begin.checked_add(len).is_some_and(|end| end <= self.size))
            .map(|begin| self.offset + begin)
            .ok_or_else(|| StorageError::out_of_range(index, len, self.size))
    }

    fn reader(&self) -> StorageResult<(RwLockReadGuard<'_, Option<NonNull<u8>>>, *mut u8)> {
        if self.node.is_freed() {
            return Err(StorageError::Freed);
        }
        let guard = self.allocation.address.read_recursive();
        let base = (*guard).ok_or(StorageError::Freed)?;
        Ok((guard, base.as_ptr()))
    }

    fn writer(&self) -> StorageResult<(RwLockWriteGuard<'_, Option<NonNull<u8>>>, *mut u8)> {
        if self.node.is_freed() {
            return Err(StorageError::Freed);
        }
        let guard = self.allocation.address.write();
        let base = (*guard).ok_or(StorageError::Freed)?;
        Ok((guard, base.as_ptr()))
    }

    /// Reads a `T` at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is out of range or the memory was freed.
    pub fn get_value<T: Primitive>(&self, index: u64) -> StorageResult<T> {
        let at = self.span(index, T::WIDTH)?;
        let (_guard, base) = self.reader()?;
        // SAFETY: span checked against the window; block held by the guard.
        Ok(unsafe { region::read_value(base.add(at), self.order) })
    }

    /// Writes a `T` at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is out of range or the memory was freed.
    pub fn set_value<T: Primitive>(&mut self, index: u64, value: T) -> StorageResult<()> {
        let at = self.span(index, T::WIDTH)?;
        let (_guard, base) = self.writer()?;
        // SAFETY: span checked against the window; exclusive access held.
        unsafe { region::write_value(base.add(at), value, self.order) };
        Ok(())
    }

    /// Reads a `T` at the sequential position and advances it.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than `T::WIDTH` bytes remain or the memory was freed.
    pub fn read_value<T: Primitive>(&mut self) -> StorageResult<T> {
        let value = self.get_value(self.cursor as u64)?;
        self.cursor += T::WIDTH;
        Ok(value)
    }

    /// Writes a `T` at the sequential position and advances it.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than `T::WIDTH` bytes remain or the memory was freed.
    pub fn write_value<T: Primitive>(&mut self, value: T) -> StorageResult<()> {
        self.set_value(self.cursor as u64, value)?;
        self.cursor += T::WIDTH;
        Ok(())
    }

    /// Reads a `T` at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index + T::WIDTH` must not exceed [`size`](Self::size).
    pub unsafe fn get_value_unchecked<T: Primitive>(&self, index: usize) -> StorageResult<T> {
        let (_guard, base) = self.reader()?;
        // SAFETY: caller guarantees the span is inside the window.
        Ok(unsafe { region::read_value(base.add(self.offset + index), self.order) })
    }

    /// Writes a `T` at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index + T::WIDTH` must not exceed [`size`](Self::size).
    pub unsafe fn set_value_unchecked<T: Primitive>(&mut self, index: usize, value: T) -> StorageResult<()> {
        let (_guard, base) = self.writer()?;
        // SAFETY: caller guarantees the span is inside the window.
        unsafe { region::write_value(base.add(self.offset + index), value, self.order) };
        Ok(())
    }

    /// Reads a `T` at the sequential position without a bounds check.
    ///
    /// # Safety
    ///
    /// At least `T::WIDTH` bytes must remain after the position.
    pub unsafe fn read_value_unchecked<T: Primitive>(&mut self) -> StorageResult<T> {
        // SAFETY: forwarded to the caller.
        let value = unsafe { self.get_value_unchecked(self.cursor) }?;
        self.cursor += T::WIDTH;
        Ok(value)
    }

    /// Writes a `T` at the sequential position without a bounds check.
    ///
    /// # Safety
    ///
    /// At least `T::WIDTH` bytes must remain after the position.
    pub unsafe fn write_value_unchecked<T: Primitive>(&mut self, value: T) -> StorageResult<()> {
        // SAFETY: forwarded to the caller.
        unsafe { self.set_value_unchecked(self.cursor, value) }?;
        self.cursor += T::WIDTH;
        Ok(())
    }

    /// Sets `len` bytes starting at `offset` to `byte`.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is out of range or the memory was freed.
    pub fn fill_range(&mut self, offset: u64, len: usize, byte: u8) -> StorageResult<()> {
        let at = self.span(offset, len)?;
        let (_guard, base) = self.writer()?;
        // SAFETY: span checked; exclusive access held.
        unsafe { region::fill(base.add(at), len, byte) };
        Ok(())
    }

    /// Copies `dst.len()` bytes starting at `offset` into `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is out of range or the memory was freed.
    pub fn copy_to(&self, offset: u64, dst: &mut [u8]) -> StorageResult<()> {
        let at = self.span(offset, dst.len())?;
        let (_guard, base) = self.reader()?;
        // SAFETY: span checked; dst is distinct caller memory.
        unsafe { std::ptr::copy_nonoverlapping(base.add(at), dst.as_mut_ptr(), dst.len()) };
        Ok(())
    }

    /// Copies `len` bytes from `source` at `offset` into this window at
    /// `index`, directly between the two blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if either span is out of range or either block was freed.
    pub fn copy_from_memory(&mut self, index: u64, source: &RawMemory, offset: u64, len: usize) -> StorageResult<()> {
        let dst = self.span(index, len)?;
        let src = source.span(offset, len)?;

        if Arc::ptr_eq(&self.allocation, &source.allocation) {
            if source.node.is_freed() {
                return Err(StorageError::Freed);
            }
            let (_guard, base) = self.writer()?;
            // SAFETY: both spans lie in this block; ptr::copy handles overlap.
            unsafe { region::copy(base.add(src), base.add(dst), len) };
            return Ok(());
        }

        // Lock the two blocks in address order so opposite copies cannot deadlock.
        let target;
        let origin;
        if Arc::as_ptr(&self.allocation) < Arc::as_ptr(&source.allocation) {
            target = self.writer()?;
            origin = source.reader()?;
        } else {
            origin = source.reader()?;
            target = self.writer()?;
        }
        // SAFETY: both spans checked and both blocks held.
        unsafe { region::copy(origin.1.add(src), target.1.add(dst), len) };
        Ok(())
    }
}

impl Drop for RawMemory {
    fn drop(&mut self) {
        if self.owner && !self.node.is_freed() {
            debug!(size = self.size, "raw memory dropped without free, reclaiming");
            self.free();
        }
    }
}

impl StorageBackend for RawMemory {
    fn kind(&self) -> BackendKind {
        BackendKind::Raw
    }

    fn set_index(&mut self, pos: u64) -> StorageResult<()> {
        self.cursor = self.span(pos, 0)? - self.offset;
        Ok(())
    }

    fn skip(&mut self, n: u64) -> StorageResult<()> {
        let len = usize::try_from(n).map_err(|_| StorageError::out_of_range(n, 0, self.size))?;
        self.span(self.cursor as u64, len)?;
        self.cursor += len;
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn release(&mut self) -> StorageResult<()> {
        self.free();
        Ok(())
    }

    fn read(&mut self) -> StorageResult<u8> {
        self.read_value()
    }

    fn read_bytes(&mut self, len: usize) -> StorageResult<Vec<u8>> {
        let bytes = self.get_bytes(self.cursor as u64, len)?;
        self.cursor += len;
        Ok(bytes)
    }

    fn get(&mut self, index: u64) -> StorageResult<u8> {
        self.get_value(index)
    }

    fn get_bytes(&mut self, index: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        self.copy_to(index, &mut bytes)?;
        Ok(bytes)
    }

    fn write(&mut self, byte: u8) -> StorageResult<()> {
        self.write_value(byte)
    }

    fn write_bytes(&mut self, data: &[u8]) -> StorageResult<()> {
        self.set_bytes(self.cursor as u64, data)?;
        self.cursor += data.len();
        Ok(())
    }

    fn set(&mut self, index: u64, byte: u8) -> StorageResult<()> {
        self.set_value(index, byte)
    }

    fn set_bytes(&mut self, index: u64, data: &[u8]) -> StorageResult<()> {
        let at = self.span(index, data.len())?;
        let (_guard, base) = self.writer()?;
        // SAFETY: span checked; exclusive access held.
        unsafe { region::write_from(base.add(at), data) };
        Ok(())
    }

    fn can_slice(&self) -> bool {
        true
    }

    fn slice(&mut self, index: u64, len: u64) -> StorageResult<Box<dyn StorageBackend>> {
        Ok(Box::new(self.slice_raw(index, len)?))
    }

    fn set_byte_order(&mut self, order: ByteOrder) {
        self.order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Default)]
    struct Counting {
        allocations: AtomicUsize,
        frees: AtomicUsize,
    }

    impl RawAllocator for Counting {
        fn allocate(&self, size: usize) -> StorageResult<NonNull<u8>> {
            self.allocations.fetch_add(1, Ordering::SeqCst);
            SystemAllocator.allocate(size)
        }

        unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
            self.frees.fetch_add(1, Ordering::SeqCst);
            unsafe { SystemAllocator.free(ptr, size) };
        }
    }

    fn counted(size: usize) -> (RawMemory, Arc<Counting>) {
        let allocator = Arc::new(Counting::default());
        let memory = RawMemory::allocate_with(size, allocator.clone()).unwrap();
        (memory, allocator)
    }

    #[test]
    fn raw_allocation_is_zeroed() {
        let mut memory = RawMemory::allocate(24).unwrap();
        assert_eq!(memory.get_bytes(0, 24).unwrap(), vec![0; 24]);
        assert!(memory.is_owner());
        assert!(memory.address().is_some());
    }

    #[test]
    fn raw_typed_roundtrip() {
        let mut memory = RawMemory::allocate(16).unwrap();
        memory.set_order(ByteOrder::BigEndian);
        memory.write_value(-2i16).unwrap();
        memory.write_value(2.25f64).unwrap();
        memory.write(0x7F).unwrap();

        assert_eq!(memory.get_bytes(0, 2).unwrap(), vec![0xFF, 0xFE]);
        memory.set_index(0).unwrap();
        assert_eq!(memory.read_value::<i16>().unwrap(), -2);
        assert_eq!(memory.read_value::<f64>().unwrap(), 2.25);
        assert_eq!(memory.read().unwrap(), 0x7F);
    }

    #[test]
    fn raw_unchecked_accessors() {
        let mut memory = RawMemory::allocate(8).unwrap();
        unsafe {
            memory.write_value_unchecked(0xABCDu16).unwrap();
            memory.set_value_unchecked(4, 77u32).unwrap();
            assert_eq!(memory.get_value_unchecked::<u32>(4).unwrap(), 77);
        }
        memory.set_index(0).unwrap();
        assert_eq!(unsafe { memory.read_value_unchecked::<u16>() }.unwrap(), 0xABCD);
    }

    #[test]
    fn raw_checked_accessors_reject_out_of_range() {
        let mut memory = RawMemory::allocate(4).unwrap();
        assert!(matches!(memory.get_value::<u64>(0), Err(StorageError::OutOfRange { .. })));
        assert!(matches!(memory.set(4, 1), Err(StorageError::OutOfRange { .. })));
    }

    #[test]
    fn raw_slice_is_view() {
        let mut memory = RawMemory::allocate(8).unwrap();
        memory.set_bytes(0, b"abcdefgh").unwrap();

        let mut view = memory.slice_raw(2, 4).unwrap();
        assert!(!view.is_owner());
        assert_eq!(view.address().unwrap(), memory.address().unwrap() + 2);
        assert_eq!(view.read_bytes(4).unwrap(), b"cdef");

        view.set(0, b'C').unwrap();
        assert_eq!(memory.get(2).unwrap(), b'C');
    }

    #[test]
    fn raw_free_cascades_to_children_once() {
        let (mut memory, allocator) = counted(32);
        let children: Vec<_> = (0..3).map(|i| memory.slice_raw(i * 8, 8).unwrap()).collect();

        memory.free();
        assert!(children.iter().all(RawMemory::is_freed));
        assert_eq!(allocator.frees.load(Ordering::SeqCst), 1);

        memory.free();
        drop(children);
        drop(memory);
        assert_eq!(allocator.allocations.load(Ordering::SeqCst), 1);
        assert_eq!(allocator.frees.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn raw_free_marks_grandchildren() {
        let mut memory = RawMemory::allocate(16).unwrap();
        let child = memory.slice_raw(4, 8).unwrap();
        let mut grandchild = child.slice_raw(2, 2).unwrap();

        memory.free();
        assert!(grandchild.is_freed());
        assert!(matches!(grandchild.get(0), Err(StorageError::Freed)));
    }

    #[test]
    fn raw_slice_free_keeps_block() {
        let (mut memory, allocator) = counted(8);
        let mut view = memory.slice_raw(0, 4).unwrap();
        let mut nested = view.slice_raw(0, 2).unwrap();

        view.free();
        assert!(view.is_freed());
        assert!(nested.is_freed());
        assert!(matches!(nested.set(0, 1), Err(StorageError::Freed)));
        assert_eq!(allocator.frees.load(Ordering::SeqCst), 0);

        memory.set(0, 1).unwrap();
        assert!(memory.slice_raw(0, 1).is_ok());
        assert!(matches!(view.slice_raw(0, 1), Err(StorageError::Freed)));
    }

    #[test]
    fn raw_access_after_free_fails() {
        let mut memory = RawMemory::allocate(8).unwrap();
        memory.release().unwrap();
        assert!(memory.is_freed());
        assert!(memory.address().is_none());
        assert!(matches!(memory.read(), Err(StorageError::Freed)));
        assert!(matches!(unsafe { memory.get_value_unchecked::<u8>(0) }, Err(StorageError::Freed)));
    }

    #[test]
    fn raw_drop_frees_owner() {
        let (memory, allocator) = counted(8);
        let view = memory.slice_raw(0, 8).unwrap();
        drop(memory);
        assert_eq!(allocator.frees.load(Ordering::SeqCst), 1);
        assert!(view.is_freed());

        // dropping a view never frees
        let (memory, allocator) = counted(8);
        drop(memory.slice_raw(0, 4).unwrap());
        assert_eq!(allocator.frees.load(Ordering::SeqCst), 0);
        drop(memory);
        assert_eq!(allocator.frees.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn raw_fill_and_copy_helpers() {
        let mut memory = RawMemory::allocate(8).unwrap();
        memory.fill_range(2, 4, 0x5A).unwrap();

        let mut out = [0u8; 8];
        memory.copy_to(0, &mut out).unwrap();
        assert_eq!(out, [0, 0, 0x5A, 0x5A, 0x5A, 0x5A, 0, 0]);

        let view = memory.slice_raw(0, 8).unwrap();
        memory.copy_from_memory(0, &view, 2, 4).unwrap();
        assert_eq!(memory.get_bytes(0, 4).unwrap(), vec![0x5A; 4]);

        let mut other = RawMemory::allocate(2).unwrap();
        other.copy_from_memory(0, &memory, 5, 2).unwrap();
        assert_eq!(other.get_bytes(0, 2).unwrap(), vec![0x5A, 0]);
    }

    #[test]
    fn raw_zero_size() {
        let (mut memory, allocator) = counted(0);
        assert!(memory.is_empty());
        assert_eq!(memory.get_bytes(0, 0).unwrap(), Vec::<u8>::new());
        memory.free();
        assert_eq!(allocator.frees.load(Ordering::SeqCst), 1);
    }
}
