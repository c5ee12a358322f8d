//! The [`Access`] front-end.
//!
//! Every operation runs the same checks, in this order: ownership,
//! released, permission, indexed (absolute-offset operations only) and
//! bounds (only when the access has a declared length). Backends below
//! therefore only see validated requests.

mod backing;
mod bulk;
mod text;
mod typed;

use crate::config::AccessOptions;
use crate::error::{AccessError, AccessResult, Permission};
use crate::ownership::Ownership;
use backing::Backing;
use ioaccess_codec::ByteOrder;
use ioaccess_storage::{
    BackendKind, FileBackend, HeapBackend, MapMode, RawAllocator, RawMemory, ScopedMemory, StorageBackend,
    StreamBackend,
};
use std::alloc::Layout;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::ptr::NonNull;
use std::sync::Arc;
use std::thread::ThreadId;
use tracing::debug;

/// Reads and writes typed values, text and raw bytes over any backend.
///
/// An access has a cursor for sequential operations, an optional declared
/// length, fixed read/write/indexed capabilities, a byte order and an
/// optional owning thread.
///
/// # Example
///
/// ```rust
/// use ioaccess_core::{Access, ByteOrder};
///
/// let mut access = Access::allocate(16);
/// access.set_byte_order(ByteOrder::BigEndian).unwrap();
/// access.write_i32(0x1122_3344).unwrap();
/// access.write_i32(0x5566_7788).unwrap();
/// access.flip().unwrap();
///
/// assert_eq!(access.get_i32(0).unwrap(), 0x1122_3344);
/// assert_eq!(access.get_i32(4).unwrap(), 0x5566_7788);
/// ```
pub struct Access {
    backing: Backing,
    cursor: u64,
    length: Option<u64>,
    indexed: bool,
    can_read: bool,
    can_write: bool,
    byte_order: ByteOrder,
    ownership: Ownership,
    released: bool,
}

impl Access {
    fn new(backing: Backing, options: AccessOptions) -> Self {
        let mut access = Self {
            backing,
            cursor: 0,
            length: options.length,
            indexed: options.indexed,
            can_read: options.can_read,
            can_write: options.can_write,
            byte_order: options.byte_order,
            ownership: if options.bind_to_current_thread {
                Ownership::current()
            } else {
                Ownership::unowned()
            },
            released: false,
        };
        access.backing.backend().set_byte_order(options.byte_order);
        access
    }

    /// Wraps any backend.
    ///
    /// Generic backends always take the checked path, even when they are
    /// scoped or raw memory behind the trait object.
    #[must_use]
    pub fn from_backend(backend: Box<dyn StorageBackend>, options: AccessOptions) -> Self {
        Self::new(Backing::Checked(backend), options)
    }

    /// Allocates a zeroed heap buffer of `size` bytes with full access.
    #[must_use]
    pub fn allocate(size: usize) -> Self {
        Self::allocate_with(size, AccessOptions::default())
    }

    /// Allocates a zeroed heap buffer of `size` bytes.
    ///
    /// The length always equals `size`; the other options apply as given.
    #[must_use]
    pub fn allocate_with(size: usize, options: AccessOptions) -> Self {
        Self::from_bytes_with(vec![0; size], options)
    }

    /// Wraps existing bytes with full access.
    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::from_bytes_with(data, AccessOptions::default())
    }

    /// Wraps existing bytes. The length always equals `data.len()`.
    #[must_use]
    pub fn from_bytes_with(data: Vec<u8>, options: AccessOptions) -> Self {
        let length = data.len() as u64;
        Self::new(
            Backing::Checked(Box::new(HeapBackend::with_data(data))),
            options.length(Some(length)),
        )
    }

    /// Opens a file for indexed access with the given permissions.
    ///
    /// File accesses are unbounded so that writes may extend the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn random_access(path: &Path, read: bool, write: bool) -> AccessResult<Self> {
        Self::random_access_with(path, AccessOptions::new().can_read(read).can_write(write))
    }

    /// Opens a file for indexed access.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn random_access_with(path: &Path, options: AccessOptions) -> AccessResult<Self> {
        let backend = FileBackend::open(path, options.can_read, options.can_write)?;
        Ok(Self::new(Backing::Checked(Box::new(backend)), options.indexed(true)))
    }

    /// Creates an unbounded read-only stream access.
    pub fn stream_reader(input: impl Read + Send + 'static) -> Self {
        Self::stream_reader_with_length(input, None)
    }

    /// Creates a read-only stream access with an optional declared length.
    pub fn stream_reader_with_length(input: impl Read + Send + 'static, length: Option<u64>) -> Self {
        Self::new(
            Backing::Checked(Box::new(StreamBackend::reader(input))),
            AccessOptions::read_only().indexed(false).length(length),
        )
    }

    /// Creates an unbounded write-only stream access.
    pub fn stream_writer(output: impl Write + Send + 'static) -> Self {
        Self::stream_writer_with_length(output, None)
    }

    /// Creates a write-only stream access with an optional declared length.
    pub fn stream_writer_with_length(output: impl Write + Send + 'static, length: Option<u64>) -> Self {
        Self::new(
            Backing::Checked(Box::new(StreamBackend::writer(output))),
            AccessOptions::write_only().indexed(false).length(length),
        )
    }

    /// Creates an unbounded stream access that reads from `input` and
    /// writes to `output`.
    pub fn stream(input: impl Read + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self::new(
            Backing::Checked(Box::new(StreamBackend::duplex(input, output))),
            AccessOptions::new().indexed(false),
        )
    }

    fn native(backing: Backing, len: usize) -> Self {
        Self::new(
            backing,
            AccessOptions::new()
                .length(Some(len as u64))
                .bind_to_current_thread(true),
        )
    }

    /// Allocates `size` zeroed bytes of scoped native memory.
    ///
    /// The access is owned by the calling thread. Single-byte backend
    /// operations are not available on scoped memory, but every typed and
    /// bulk operation of the access is.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub fn scoped_memory(size: usize) -> AccessResult<Self> {
        Ok(Self::native(Backing::Scoped(ScopedMemory::allocate(size)?), size))
    }

    /// Allocates `size` zeroed bytes of scoped native memory with the given
    /// alignment, owned by the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout is invalid or the allocation fails.
    pub fn scoped_aligned_memory(size: usize, alignment: usize) -> AccessResult<Self> {
        Ok(Self::native(
            Backing::Scoped(ScopedMemory::allocate_aligned(size, alignment)?),
            size,
        ))
    }

    /// Allocates zeroed scoped native memory described by `layout`, owned by
    /// the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub fn scoped_layout(layout: Layout) -> AccessResult<Self> {
        Ok(Self::native(
            Backing::Scoped(ScopedMemory::allocate_layout(layout)?),
            layout.size(),
        ))
    }

    /// Maps `size` bytes of a file, starting at `offset`, owned by the
    /// calling thread. A read-only mapping gives a read-only access.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    pub fn map_file(path: &Path, offset: u64, size: usize, mode: MapMode) -> AccessResult<Self> {
        let memory = ScopedMemory::map_file(path, offset, size, mode)?;
        let mut access = Self::native(Backing::Scoped(memory), size);
        access.can_write = mode != MapMode::ReadOnly;
        Ok(access)
    }

    /// Wraps `size` bytes at a foreign address as scoped memory, owned by
    /// the calling thread.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `size` bytes until the
    /// access is released or dropped, and nothing else may use that memory
    /// in the meantime.
    #[must_use]
    pub unsafe fn at_address(ptr: NonNull<u8>, size: usize) -> Self {
        // SAFETY: forwarded to the caller.
        let memory = unsafe { ScopedMemory::at_address(ptr, size) };
        Self::native(Backing::Scoped(memory), size)
    }

    /// Allocates `size` zeroed bytes of raw memory, owned by the calling
    /// thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    pub fn raw(size: usize) -> AccessResult<Self> {
        Ok(Self::native(Backing::Raw(RawMemory::allocate(size)?), size))
    }

    /// Allocates `size` zeroed bytes of raw memory from `allocator`, owned
    /// by the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocator fails.
    pub fn raw_with_allocator(size: usize, allocator: Arc<dyn RawAllocator>) -> AccessResult<Self> {
        Ok(Self::native(
            Backing::Raw(RawMemory::allocate_with(size, allocator)?),
            size,
        ))
    }

    // ------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------

    fn check_live(&self) -> AccessResult<()> {
        self.ownership.check()?;
        if self.released {
            return Err(AccessError::Released);
        }
        Ok(())
    }

    fn check_permission(&self, required: Permission) -> AccessResult<()> {
        let granted = match required {
            Permission::Read => self.can_read,
            Permission::Write => self.can_write,
        };
        if granted {
            Ok(())
        } else {
            Err(AccessError::permission(required))
        }
    }

    fn check_indexed(&self, operation: &str) -> AccessResult<()> {
        if self.indexed {
            Ok(())
        } else {
            Err(AccessError::unsupported(format!("{operation} on a non-indexed access")))
        }
    }

    fn check_span(&self, position: u64, len: u64) -> AccessResult<()> {
        match self.length {
            Some(length) if position.checked_add(len).map_or(true, |end| end > length) => {
                Err(AccessError::Bounds { position, len, length })
            }
            _ => Ok(()),
        }
    }

    /// Checks for a sequential operation over `len` bytes at the cursor.
    fn check_sequential(&self, required: Permission, len: u64) -> AccessResult<()> {
        self.check_live()?;
        self.check_permission(required)?;
        self.check_span(self.cursor, len)
    }

    /// Checks for an absolute-offset operation over `len` bytes at `index`.
    fn check_at(&self, required: Permission, operation: &str, index: u64, len: u64) -> AccessResult<()> {
        self.check_live()?;
        self.check_permission(required)?;
        self.check_indexed(operation)?;
        self.check_span(index, len)
    }

    fn advance(&mut self, n: u64) {
        self.cursor = self.cursor.saturating_add(n);
    }

    // ------------------------------------------------------------------
    // Positioning
    // ------------------------------------------------------------------

    /// Returns the cursor position.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.cursor
    }

    /// Moves the cursor to `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Unsupported`] on a non-indexed access, or
    /// [`AccessError::Bounds`] if `pos` exceeds the length.
    pub fn set_index(&mut self, pos: u64) -> AccessResult<()> {
        self.check_live()?;
        self.check_indexed("set_index")?;
        self.check_span(pos, 0)?;
        self.backing.seek(pos)?;
        self.cursor = pos;
        Ok(())
    }

    /// Returns the bytes left between the cursor and the length, or `None`
    /// for an unbounded access.
    #[must_use]
    pub fn remaining(&self) -> Option<u64> {
        self.length.map(|length| length.saturating_sub(self.cursor))
    }

    /// Skips `n` bytes of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the access is not readable or fewer than `n`
    /// bytes remain.
    pub fn skip(&mut self, n: u64) -> AccessResult<()> {
        self.check_sequential(Permission::Read, n)?;
        self.backing.skip(n)?;
        self.advance(n);
        Ok(())
    }

    /// Resets the cursor to 0 without touching the contents.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Unsupported`] on a non-indexed access.
    pub fn flip(&mut self) -> AccessResult<()> {
        self.check_live()?;
        self.check_indexed("flip")?;
        self.backing.seek(0)?;
        self.cursor = 0;
        Ok(())
    }

    /// Sets the byte order for multi-byte typed values.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not the owner or the access is released.
    pub fn set_byte_order(&mut self, order: ByteOrder) -> AccessResult<()> {
        self.check_live()?;
        self.byte_order = order;
        self.backing.backend().set_byte_order(order);
        Ok(())
    }

    /// Returns the byte order for multi-byte typed values.
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    // ------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------

    /// Makes the calling thread the owner.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Ownership`] if another thread owns the access.
    pub fn acquire_ownership(&mut self) -> AccessResult<()> {
        self.ownership.transfer(Some(std::thread::current().id()))
    }

    /// Hands ownership to `owner`, or removes the restriction with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Ownership`] if another thread owns the access.
    pub fn set_owner(&mut self, owner: Option<ThreadId>) -> AccessResult<()> {
        self.ownership.transfer(owner)
    }

    /// Returns true if the access is bound to a thread.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.ownership.is_owned()
    }

    /// Returns the owning thread, if any.
    #[must_use]
    pub fn owner(&self) -> Option<ThreadId> {
        self.ownership.owner()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Pushes pending writes to the underlying storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to flush.
    pub fn flush(&mut self) -> AccessResult<()> {
        self.check_live()?;
        self.backing.backend().flush()?;
        Ok(())
    }

    /// Releases the backend. The access is unusable afterwards.
    ///
    /// The access counts as released even if the backend reports an error
    /// while releasing.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Released`] on a second call, or the backend's
    /// release error.
    pub fn release(&mut self) -> AccessResult<()> {
        self.check_live()?;
        self.released = true;
        let result = self.backing.backend().release();
        debug!(kind = %self.backing.kind(), "released access");
        result.map_err(AccessError::from)
    }

    // ------------------------------------------------------------------
    // Reflection
    // ------------------------------------------------------------------

    /// Returns the declared length, or `None` when unbounded.
    #[must_use]
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Returns true if absolute-offset operations are permitted.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Returns true if reads are permitted.
    #[must_use]
    pub fn can_read(&self) -> bool {
        self.can_read
    }

    /// Returns true if writes are permitted.
    #[must_use]
    pub fn can_write(&self) -> bool {
        self.can_write
    }

    /// Returns true once [`release`](Self::release) has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Returns the kind of storage behind the access.
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backing.kind()
    }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Access")
            .field("backend", &self.backing.kind())
            .field("cursor", &self.cursor)
            .field("length", &self.length)
            .field("indexed", &self.indexed)
            .field("can_read", &self.can_read)
            .field("can_write", &self.can_write)
            .field("byte_order", &self.byte_order)
            .field("owner", &self.ownership.owner())
            .field("released", &self.released)
            .finish()
    }
}
