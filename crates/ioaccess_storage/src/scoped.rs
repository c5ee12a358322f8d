//! Scoped native memory backend.
//!
//! A [`Scope`] owns one native region: an aligned heap allocation, a file
//! mapping, or a foreign address. Every [`ScopedMemory`] window over the
//! region holds an `Arc` to the scope, so slices share it and the scope is
//! the unit of release. Closing the scope drops the region once; any later
//! access through any window fails with [`StorageError::ScopeClosed`].
//!
//! The region sits behind a lock. Reads take it shared, writes and close
//! take it exclusively, so a close racing an access on another thread can
//! never leave that access reading unmapped memory.

use crate::backend::{BackendKind, StorageBackend};
use crate::error::{StorageError, StorageResult};
use crate::region;
use ioaccess_codec::{ByteOrder, Primitive};
use memmap2::{Mmap, MmapMut, MmapOptions};
use parking_lot::RwLock;
use std::alloc::{self, Layout};
use std::fs::OpenOptions;
use std::path::Path;
use std::ptr::NonNull;
use std::sync::Arc;
use tracing::{debug, trace};

/// Default alignment of [`ScopedMemory::allocate`].
pub const DEFAULT_ALIGNMENT: usize = 8;

/// How a file region is mapped into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapMode {
    /// Read-only shared mapping.
    ReadOnly,
    /// Writable shared mapping; writes reach the file.
    #[default]
    ReadWrite,
    /// Writable copy-on-write mapping; writes never reach the file.
    Private,
}

#[derive(Debug)]
enum Holder {
    Empty,
    Allocated(Layout),
    Mapped { map: MmapMut, shared: bool },
    MappedReadOnly(Mmap),
    Foreign,
}

#[derive(Debug)]
struct Region {
    base: NonNull<u8>,
    len: usize,
    writable: bool,
    holder: Holder,
}

// SAFETY: the region is plain bytes. All access to it goes through the
// scope lock, which serializes writers against readers.
unsafe impl Send for Region {}
// SAFETY: see above.
unsafe impl Sync for Region {}

impl Region {
    fn empty() -> Self {
        Self {
            base: NonNull::dangling(),
            len: 0,
            writable: true,
            holder: Holder::Empty,
        }
    }

    fn at(&self, offset: usize) -> *mut u8 {
        self.base.as_ptr().wrapping_add(offset)
    }

    fn writable(&self) -> StorageResult<&Self> {
        if self.writable {
            Ok(self)
        } else {
            Err(StorageError::NotWritable)
        }
    }

    fn flush(&self) -> StorageResult<()> {
        if let Holder::Mapped { map, shared: true } = &self.holder {
            map.flush()?;
        }
        Ok(())
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if let Holder::Allocated(layout) = self.holder {
            // SAFETY: base came from alloc_zeroed with this exact layout and
            // is released only here.
            unsafe { alloc::dealloc(self.base.as_ptr(), layout) };
        }
    }
}

/// Lifetime of one native memory region.
///
/// Dropping the last handle to a scope also releases its region.
#[derive(Debug)]
pub struct Scope {
    region: RwLock<Option<Region>>,
}

impl Scope {
    fn new(region: Region) -> Arc<Self> {
        Arc::new(Self {
            region: RwLock::new(Some(region)),
        })
    }

    /// Returns true until the scope is closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.region.read().is_some()
    }

    /// Closes the scope, freeing or unmapping its region.
    ///
    /// Returns false if the scope was already closed.
    pub fn close(&self) -> bool {
        let Some(region) = self.region.write().take() else {
            return false;
        };
        debug!(len = region.len, "closed memory scope");
        drop(region);
        true
    }
}

fn open(region: &Option<Region>) -> StorageResult<&Region> {
    region.as_ref().ok_or(StorageError::ScopeClosed)
}

/// A window onto a scoped native memory region.
///
/// Typed accessors encode under the window's byte order. Checked accessors
/// validate bounds; the `_unchecked` variants skip that and exist for
/// callers that already validated the span.
///
/// The single-byte [`StorageBackend`] operations (`read`, `write`, `get`,
/// `set`) are not supported. Use the typed accessors or the bulk operations.
///
/// # Example
///
/// ```rust
/// use ioaccess_storage::ScopedMemory;
/// use ioaccess_codec::ByteOrder;
///
/// let mut memory = ScopedMemory::allocate(16).unwrap();
/// memory.set_order(ByteOrder::BigEndian);
/// memory.set_value(0, 0x1122_3344u32).unwrap();
/// assert_eq!(memory.get_value::<u8>(0).unwrap(), 0x11);
/// ```
#[derive(Debug)]
pub struct ScopedMemory {
    scope: Arc<Scope>,
    offset: usize,
    len: usize,
    cursor: usize,
    order: ByteOrder,
}

impl ScopedMemory {
    /// Allocates `size` zeroed bytes aligned to [`DEFAULT_ALIGNMENT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub fn allocate(size: usize) -> StorageResult<Self> {
        Self::allocate_aligned(size, DEFAULT_ALIGNMENT)
    }

    /// Allocates `size` zeroed bytes with the given alignment.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidLayout`] if `alignment` is not a power
    /// of two or the size overflows, or an allocation failure.
    pub fn allocate_aligned(size: usize, alignment: usize) -> StorageResult<Self> {
        let layout = Layout::from_size_align(size, alignment)
            .map_err(|_| StorageError::InvalidLayout { size, alignment })?;
        Self::allocate_layout(layout)
    }

    /// Allocates zeroed memory described by `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AllocationFailed`] if the allocator returns null.
    pub fn allocate_layout(layout: Layout) -> StorageResult<Self> {
        if layout.size() == 0 {
            return Ok(Self::over(Region::empty()));
        }

        // SAFETY: layout has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let base = NonNull::new(ptr).ok_or(StorageError::AllocationFailed { size: layout.size() })?;

        debug!(size = layout.size(), align = layout.align(), "allocated scoped memory");

        Ok(Self::over(Region {
            base,
            len: layout.size(),
            writable: true,
            holder: Holder::Allocated(layout),
        }))
    }

    /// Maps `size` bytes of the file at `path`, starting at `offset`.
    ///
    /// A [`MapMode::ReadWrite`] mapping creates the file and extends it if it
    /// is shorter than `offset + size`. The other modes require the file to
    /// already cover the requested span.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is too short, or the
    /// mapping fails.
    pub fn map_file(path: &Path, offset: u64, size: usize, mode: MapMode) -> StorageResult<Self> {
        let writable = mode == MapMode::ReadWrite;
        let file = OpenOptions::new()
            .read(true)
            .write(writable)
            .create(writable)
            .truncate(false)
            .open(path)?;

        let end = offset
            .checked_add(size as u64)
            .ok_or_else(|| StorageError::out_of_range(offset, size, usize::MAX))?;
        let file_len = file.metadata()?.len();
        if file_len < end {
            if !writable {
                return Err(StorageError::OutOfRange {
                    offset,
                    len: size,
                    size: file_len,
                });
            }
            file.set_len(end)?;
        }

        if size == 0 {
            let mut region = Region::empty();
            region.writable = mode != MapMode::ReadOnly;
            return Ok(Self::over(region));
        }

        let mut options = MmapOptions::new();
        options.offset(offset).len(size);

        // SAFETY: the mapping is owned by the scope and dropped only when the
        // scope closes, after which no window dereferences it. Concurrent
        // modification of the file by other processes is outside this
        // crate's control, as with any mapping.
        let region = unsafe {
            match mode {
                MapMode::ReadOnly => {
                    let map = options.map(&file)?;
                    Region {
                        base: NonNull::new(map.as_ptr().cast_mut()).ok_or(StorageError::AllocationFailed { size })?,
                        len: size,
                        writable: false,
                        holder: Holder::MappedReadOnly(map),
                    }
                }
                MapMode::ReadWrite | MapMode::Private => {
                    let mut map = if writable {
                        options.map_mut(&file)?
                    } else {
                        options.map_copy(&file)?
                    };
                    Region {
                        base: NonNull::new(map.as_mut_ptr()).ok_or(StorageError::AllocationFailed { size })?,
                        len: size,
                        writable: true,
                        holder: Holder::Mapped { map, shared: writable },
                    }
                }
            }
        };

        debug!(path = %path.display(), offset, size, ?mode, "mapped file region");
        Ok(Self::over(region))
    }

    /// Wraps `size` bytes at a foreign address as a scoped region.
    ///
    /// Closing the scope never frees foreign memory.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `size` bytes for as long
    /// as the scope stays open, and nothing else may access that memory
    /// while it does.
    #[must_use]
    pub unsafe fn at_address(ptr: NonNull<u8>, size: usize) -> Self {
        trace!(address = ptr.as_ptr() as usize, size, "wrapped foreign address");
        Self::over(Region {
            base: ptr,
            len: size,
            writable: true,
            holder: Holder::Foreign,
        })
    }

    fn over(region: Region) -> Self {
        let len = region.len;
        Self {
            scope: Scope::new(region),
            offset: 0,
            len,
            cursor: 0,
            order: ByteOrder::native(),
        }
    }

    /// Returns the size of this window in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
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

    /// Returns the scope shared by this window and its slices.
    #[must_use]
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    /// Returns true while the scope is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.scope.is_open()
    }

    /// Returns true if the region accepts writes. A closed region does not.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.scope.region.read().as_ref().is_some_and(|r| r.writable)
    }

    /// Closes the shared scope. Returns false if it was already closed.
    pub fn close(&self) -> bool {
        self.scope.close()
    }

    /// Maps a window-relative span to an offset in the region.
    fn span(&self, index: u64, len: usize) -> StorageResult<usize> {
        usize::try_from(index)
            .ok()
            .filter(|begin| begin.checked_add(len).is_some_and(|end| end <= self.len))
            .map(|begin| self.offset + begin)
            .ok_or_else(|| StorageError::out_of_range(index, len, self.len))
    }

    /// Creates a window over `len` bytes at `index` sharing this scope.
    ///
    /// The slice starts at position 0 and inherits the byte order.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is outside this window or the scope is closed.
    pub fn slice_scoped(&self, index: u64, len: u64) -> StorageResult<Self> {
        let len = usize::try_from(len).map_err(|_| StorageError::out_of_range(index, 0, self.len))?;
        let offset = self.span(index, len)?;
        open(&self.scope.region.read_recursive())?;
        trace!(offset, len, "sliced scoped memory");
        Ok(Self {
            scope: Arc::clone(&self.scope),
            offset,
            len,
            cursor: 0,
            order: self.order,
        })
    }

    /// Reads a `T` at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is out of range or the scope is closed.
    pub fn get_value<T: Primitive>(&self, index: u64) -> StorageResult<T> {
        let at = self.span(index, T::WIDTH)?;
        let guard = self.scope.region.read_recursive();
        let region = open(&guard)?;
        // SAFETY: span checked against the window, which lies inside the
        // region, and the region is held open by the guard.
        Ok(unsafe { region::read_value(region.at(at), self.order) })
    }

    /// Writes a `T` at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is out of range, the region is read-only,
    /// or the scope is closed.
    pub fn set_value<T: Primitive>(&mut self, index: u64, value: T) -> StorageResult<()> {
        let at = self.span(index, T::WIDTH)?;
        let guard = self.scope.region.write();
        let region = open(&guard)?.writable()?;
        // SAFETY: as in get_value, with exclusive access held.
        unsafe { region::write_value(region.at(at), value, self.order) };
        Ok(())
    }

    /// Reads a `T` at the sequential position and advances it.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than `T::WIDTH` bytes remain or the scope is closed.
    pub fn read_value<T: Primitive>(&mut self) -> StorageResult<T> {
        let value = self.get_value(self.cursor as u64)?;
        self.cursor += T::WIDTH;
        Ok(value)
    }

    /// Writes a `T` at the sequential position and advances it.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than `T::WIDTH` bytes remain, the region is
    /// read-only, or the scope is closed.
    pub fn write_value<T: Primitive>(&mut self, value: T) -> StorageResult<()> {
        self.set_value(self.cursor as u64, value)?;
        self.cursor += T::WIDTH;
        Ok(())
    }

    /// Reads a `T` at `index` without a bounds check.
    ///
    /// The scope is still checked, so a closed region reports
    /// [`StorageError::ScopeClosed`] instead of being read.
    ///
    /// # Safety
    ///
    /// `index + T::WIDTH` must not exceed [`len`](Self::len).
    pub unsafe fn get_value_unchecked<T: Primitive>(&self, index: usize) -> StorageResult<T> {
        let guard = self.scope.region.read_recursive();
        let region = open(&guard)?;
        // SAFETY: caller guarantees the span is inside the window.
        Ok(unsafe { region::read_value(region.at(self.offset + index), self.order) })
    }

    /// Writes a `T` at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index + T::WIDTH` must not exceed [`len`](Self::len).
    pub unsafe fn set_value_unchecked<T: Primitive>(&mut self, index: usize, value: T) -> StorageResult<()> {
        let guard = self.scope.region.write();
        let region = open(&guard)?.writable()?;
        // SAFETY: caller guarantees the span is inside the window.
        unsafe { region::write_value(region.at(self.offset + index), value, self.order) };
        Ok(())
    }

    /// Sets `len` bytes starting at `index` to `byte`.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is out of range, the region is read-only,
    /// or the scope is closed.
    pub fn fill(&mut self, index: u64, len: usize, byte: u8) -> StorageResult<()> {
        let at = self.span(index, len)?;
        let guard = self.scope.region.write();
        let region = open(&guard)?.writable()?;
        // SAFETY: span checked, exclusive access held.
        unsafe { region::fill(region.at(at), len, byte) };
        Ok(())
    }

    /// Copies `len` bytes from `source` at `offset` into this window at
    /// `index`, directly between the two regions.
    ///
    /// Overlapping spans within one scope are handled like `memmove`.
    ///
    /// # Errors
    ///
    /// Returns an error if either span is out of range, this region is
    /// read-only, or either scope is closed.
    pub fn copy_from_memory(
        &mut self,
        index: u64,
        source: &ScopedMemory,
        offset: u64,
        len: usize,
    ) -> StorageResult<()> {
        let dst = self.span(index, len)?;
        let src = source.span(offset, len)?;

        if Arc::ptr_eq(&self.scope, &source.scope) {
            let guard = self.scope.region.write();
            let region = open(&guard)?.writable()?;
            // SAFETY: both spans checked against windows of the same region.
            unsafe { region::copy(region.at(src), region.at(dst), len) };
            return Ok(());
        }

        // Lock the two scopes in address order so opposite copies cannot deadlock.
        let dst_guard;
        let src_guard;
        if Arc::as_ptr(&self.scope) < Arc::as_ptr(&source.scope) {
            dst_guard = self.scope.region.write();
            src_guard = source.scope.region.read_recursive();
        } else {
            src_guard = source.scope.region.read_recursive();
            dst_guard = self.scope.region.write();
        }
        let target = open(&dst_guard)?.writable()?;
        let origin = open(&src_guard)?;
        // SAFETY: both spans checked and both regions held open.
        unsafe { region::copy(origin.at(src), target.at(dst), len) };
        Ok(())
    }
}

impl StorageBackend for ScopedMemory {
    fn kind(&self) -> BackendKind {
        BackendKind::Scoped
    }

    fn set_index(&mut self, pos: u64) -> StorageResult<()> {
        self.cursor = self.span(pos, 0)? - self.offset;
        Ok(())
    }

    fn skip(&mut self, n: u64) -> StorageResult<()> {
        let len = usize::try_from(n).map_err(|_| StorageError::out_of_range(n, 0, self.len))?;
        self.span(self.cursor as u64, len)?;
        self.cursor += len;
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        open(&self.scope.region.read_recursive())?.flush()
    }

    fn release(&mut self) -> StorageResult<()> {
        self.close();
        Ok(())
    }

    fn read(&mut self) -> StorageResult<u8> {
        Err(StorageError::unsupported("read", BackendKind::Scoped))
    }

    fn read_bytes(&mut self, len: usize) -> StorageResult<Vec<u8>> {
        let bytes = self.get_bytes(self.cursor as u64, len)?;
        self.cursor += len;
        Ok(bytes)
    }

    fn get(&mut self, _index: u64) -> StorageResult<u8> {
        Err(StorageError::unsupported("get", BackendKind::Scoped))
    }

    fn get_bytes(&mut self, index: u64, len: usize) -> StorageResult<Vec<u8>> {
        let at = self.span(index, len)?;
        let guard = self.scope.region.read_recursive();
        let region = open(&guard)?;
        // SAFETY: span checked, region held open.
        Ok(unsafe { region::read_into(region.at(at), len) })
    }

    fn write(&mut self, _byte: u8) -> StorageResult<()> {
        Err(StorageError::unsupported("write", BackendKind::Scoped))
    }

    fn write_bytes(&mut self, data: &[u8]) -> StorageResult<()> {
        self.set_bytes(self.cursor as u64, data)?;
        self.cursor += data.len();
        Ok(())
    }

    fn set(&mut self, _index: u64, _byte: u8) -> StorageResult<()> {
        Err(StorageError::unsupported("set", BackendKind::Scoped))
    }

    fn set_bytes(&mut self, index: u64, data: &[u8]) -> StorageResult<()> {
        let at = self.span(index, data.len())?;
        let guard = self.scope.region.write();
        let region = open(&guard)?.writable()?;
        // SAFETY: span checked, exclusive access held; data is caller memory
        // and cannot overlap a region we hold exclusively.
        unsafe { region::write_from(region.at(at), data) };
        Ok(())
    }

    fn can_slice(&self) -> bool {
        true
    }

    fn slice(&mut self, index: u64, len: u64) -> StorageResult<Box<dyn StorageBackend>> {
        Ok(Box::new(self.slice_scoped(index, len)?))
    }

    fn set_byte_order(&mut self, order: ByteOrder) {
        self.order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scoped_allocation_is_zeroed() {
        let mut memory = ScopedMemory::allocate(32).unwrap();
        assert_eq!(memory.len(), 32);
        assert_eq!(memory.get_bytes(0, 32).unwrap(), vec![0; 32]);
        assert!(memory.is_open());
        assert!(memory.is_writable());
    }

    #[test]
    fn scoped_typed_values_follow_order() {
        let mut memory = ScopedMemory::allocate(8).unwrap();
        memory.set_order(ByteOrder::BigEndian);
        memory.set_value(0, 0x1122_3344u32).unwrap();
        assert_eq!(memory.get_bytes(0, 4).unwrap(), vec![0x11, 0x22, 0x33, 0x44]);

        memory.set_order(ByteOrder::LittleEndian);
        assert_eq!(memory.get_value::<u32>(0).unwrap(), 0x4433_2211);
    }

    #[test]
    fn scoped_sequential_values_advance() {
        let mut memory = ScopedMemory::allocate(16).unwrap();
        memory.write_value(7i64).unwrap();
        memory.write_value(1.5f32).unwrap();
        assert_eq!(memory.position(), 12);

        memory.set_index(0).unwrap();
        assert_eq!(memory.read_value::<i64>().unwrap(), 7);
        assert_eq!(memory.read_value::<f32>().unwrap(), 1.5);
    }

    #[test]
    fn scoped_out_of_range_fails() {
        let memory = ScopedMemory::allocate(4).unwrap();
        assert!(matches!(memory.get_value::<u64>(0), Err(StorageError::OutOfRange { .. })));
        assert!(matches!(memory.get_value::<u8>(4), Err(StorageError::OutOfRange { .. })));
    }

    #[test]
    fn scoped_unchecked_reads_checked_writes() {
        let mut memory = ScopedMemory::allocate(8).unwrap();
        memory.set_value(2, 0xBEEFu16).unwrap();
        let value = unsafe { memory.get_value_unchecked::<u16>(2) }.unwrap();
        assert_eq!(value, 0xBEEF);

        unsafe { memory.set_value_unchecked(4, 9u8) }.unwrap();
        assert_eq!(memory.get_value::<u8>(4).unwrap(), 9);
    }

    #[test]
    fn scoped_single_byte_ops_unsupported() {
        let mut memory = ScopedMemory::allocate(4).unwrap();
        assert!(matches!(memory.read(), Err(StorageError::Unsupported { operation: "read", .. })));
        assert!(matches!(memory.write(1), Err(StorageError::Unsupported { .. })));
        assert!(matches!(memory.get(0), Err(StorageError::Unsupported { .. })));
        assert!(matches!(memory.set(0, 1), Err(StorageError::Unsupported { .. })));
    }

    #[test]
    fn scoped_slice_shares_scope() {
        let mut memory = ScopedMemory::allocate(16).unwrap();
        memory.set_bytes(0, b"0123456789abcdef").unwrap();

        let mut slice = memory.slice_scoped(4, 4).unwrap();
        assert!(Arc::ptr_eq(memory.scope(), slice.scope()));
        assert_eq!(slice.read_bytes(4).unwrap(), b"4567");

        slice.set_bytes(0, b"XY").unwrap();
        assert_eq!(memory.get_bytes(4, 2).unwrap(), b"XY");

        assert!(slice.slice_scoped(2, 3).is_err());
    }

    #[test]
    fn scoped_close_invalidates_every_window() {
        let mut memory = ScopedMemory::allocate(8).unwrap();
        let mut sibling = memory.slice_scoped(0, 4).unwrap();

        memory.release().unwrap();
        assert!(!sibling.is_open());
        assert!(matches!(sibling.get_bytes(0, 1), Err(StorageError::ScopeClosed)));
        assert!(matches!(sibling.set_value(0, 1u8), Err(StorageError::ScopeClosed)));
        let unchecked = unsafe { sibling.get_value_unchecked::<u8>(0) };
        assert!(matches!(unchecked, Err(StorageError::ScopeClosed)));

        // closing twice is a no-op
        assert!(!sibling.close());
        assert!(sibling.release().is_ok());
    }

    #[test]
    fn scoped_zero_size_is_valid() {
        let mut memory = ScopedMemory::allocate(0).unwrap();
        assert!(memory.is_empty());
        assert_eq!(memory.get_bytes(0, 0).unwrap(), Vec::<u8>::new());
        assert!(memory.set_index(0).is_ok());
        assert!(memory.close());
    }

    #[test]
    fn scoped_alignment_honored() {
        let memory = ScopedMemory::allocate_aligned(64, 64).unwrap();
        let guard = memory.scope().region.read();
        let base = guard.as_ref().unwrap().base.as_ptr() as usize;
        assert_eq!(base % 64, 0);
    }

    #[test]
    fn scoped_invalid_alignment_rejected() {
        let result = ScopedMemory::allocate_aligned(16, 3);
        assert!(matches!(result, Err(StorageError::InvalidLayout { size: 16, alignment: 3 })));
    }

    #[test]
    fn scoped_fill_and_copy() {
        let mut memory = ScopedMemory::allocate(8).unwrap();
        memory.fill(0, 4, 0xAA).unwrap();
        let source = memory.slice_scoped(0, 8).unwrap();
        memory.copy_from_memory(2, &source, 0, 4).unwrap();
        assert_eq!(memory.get_bytes(0, 8).unwrap(), vec![0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0, 0]);

        let mut other = ScopedMemory::allocate(4).unwrap();
        other.copy_from_memory(0, &memory, 4, 4).unwrap();
        assert_eq!(other.get_bytes(0, 4).unwrap(), vec![0xAA, 0xAA, 0, 0]);
    }

    #[test]
    fn scoped_at_address_wraps_foreign_memory() {
        let mut buffer = vec![1u8, 2, 3, 4];
        let ptr = NonNull::new(buffer.as_mut_ptr()).unwrap();
        {
            let mut memory = unsafe { ScopedMemory::at_address(ptr, 4) };
            assert_eq!(memory.get_bytes(1, 2).unwrap(), vec![2, 3]);
            memory.set_bytes(0, &[9]).unwrap();
            memory.close();
        }
        assert_eq!(buffer, vec![9, 2, 3, 4]);
    }

    #[test]
    fn scoped_map_read_write_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mapped.bin");

        let mut memory = ScopedMemory::map_file(&path, 0, 8, MapMode::ReadWrite).unwrap();
        memory.set_bytes(0, b"mapped!!").unwrap();
        memory.flush().unwrap();
        memory.release().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"mapped!!");
    }

    #[test]
    fn scoped_map_with_offset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mapped.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let mut memory = ScopedMemory::map_file(&path, 4, 3, MapMode::ReadOnly).unwrap();
        assert_eq!(memory.get_bytes(0, 3).unwrap(), b"456");
        assert!(!memory.is_writable());
        assert!(matches!(memory.set_bytes(0, b"x"), Err(StorageError::NotWritable)));
    }

    #[test]
    fn scoped_map_private_leaves_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mapped.bin");
        std::fs::write(&path, b"abcd").unwrap();

        let mut memory = ScopedMemory::map_file(&path, 0, 4, MapMode::Private).unwrap();
        memory.set_bytes(0, b"zz").unwrap();
        assert_eq!(memory.get_bytes(0, 4).unwrap(), b"zzcd");
        memory.flush().unwrap();
        drop(memory);

        assert_eq!(std::fs::read(&path).unwrap(), b"abcd");
    }

    #[test]
    fn scoped_map_short_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mapped.bin");
        std::fs::write(&path, b"ab").unwrap();

        let result = ScopedMemory::map_file(&path, 0, 4, MapMode::ReadOnly);
        assert!(matches!(result, Err(StorageError::OutOfRange { size: 2, .. })));
    }
}
