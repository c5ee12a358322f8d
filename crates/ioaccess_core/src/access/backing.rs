//! Backend dispatch for [`Access`](super::Access).
//!
//! Generic backends go through the [`StorageBackend`] contract and a byte
//! buffer. Scoped and raw memory get their own arms so typed values move
//! straight between registers and memory.

use crate::error::AccessResult;
use ioaccess_codec::{decode, encode, ByteOrder, Primitive};
use ioaccess_storage::{BackendKind, RawMemory, ScopedMemory, StorageBackend, StorageResult};

pub(crate) enum Backing {
    Checked(Box<dyn StorageBackend>),
    Scoped(ScopedMemory),
    Raw(RawMemory),
}

impl Backing {
    pub(crate) fn backend(&mut self) -> &mut dyn StorageBackend {
        match self {
            Self::Checked(backend) => backend.as_mut(),
            Self::Scoped(memory) => memory,
            Self::Raw(memory) => memory,
        }
    }

    pub(crate) fn kind(&self) -> BackendKind {
        match self {
            Self::Checked(backend) => backend.kind(),
            Self::Scoped(_) => BackendKind::Scoped,
            Self::Raw(_) => BackendKind::Raw,
        }
    }

    pub(crate) fn can_slice(&self) -> bool {
        match self {
            Self::Checked(backend) => backend.can_slice(),
            Self::Scoped(_) | Self::Raw(_) => true,
        }
    }

    pub(crate) fn is_native(&self) -> bool {
        !matches!(self, Self::Checked(_))
    }

    /// Reads a `T` at the access cursor.
    ///
    /// # Safety
    ///
    /// For native backings `cursor + T::WIDTH` must lie inside the window.
    pub(crate) unsafe fn read_value<T: Primitive>(&mut self, cursor: u64, order: ByteOrder) -> AccessResult<T> {
        match self {
            // SAFETY: forwarded to the caller.
            Self::Scoped(memory) => Ok(unsafe { memory.get_value_unchecked(cursor as usize) }?),
            // SAFETY: forwarded to the caller.
            Self::Raw(memory) => Ok(unsafe { memory.get_value_unchecked(cursor as usize) }?),
            Self::Checked(backend) => Ok(decode(&backend.read_bytes(T::WIDTH)?, order)?),
        }
    }

    /// Writes a `T` at the access cursor.
    ///
    /// # Safety
    ///
    /// For native backings `cursor + T::WIDTH` must lie inside the window.
    pub(crate) unsafe fn write_value<T: Primitive>(&mut self, cursor: u64, value: T, order: ByteOrder) -> AccessResult<()> {
        match self {
            // SAFETY: forwarded to the caller.
            Self::Scoped(memory) => Ok(unsafe { memory.set_value_unchecked(cursor as usize, value) }?),
            // SAFETY: forwarded to the caller.
            Self::Raw(memory) => Ok(unsafe { memory.set_value_unchecked(cursor as usize, value) }?),
            Self::Checked(backend) => Ok(backend.write_bytes(encode(value, order).as_ref())?),
        }
    }

    /// Reads a `T` at `index`.
    ///
    /// # Safety
    ///
    /// For native backings `index + T::WIDTH` must lie inside the window.
    pub(crate) unsafe fn get_value<T: Primitive>(&mut self, index: u64, order: ByteOrder) -> AccessResult<T> {
        match self {
            // SAFETY: forwarded to the caller.
            Self::Scoped(memory) => Ok(unsafe { memory.get_value_unchecked(index as usize) }?),
            // SAFETY: forwarded to the caller.
            Self::Raw(memory) => Ok(unsafe { memory.get_value_unchecked(index as usize) }?),
            Self::Checked(backend) => Ok(decode(&backend.get_bytes(index, T::WIDTH)?, order)?),
        }
    }

    /// Writes a `T` at `index`.
    ///
    /// # Safety
    ///
    /// For native backings `index + T::WIDTH` must lie inside the window.
    pub(crate) unsafe fn set_value<T: Primitive>(&mut self, index: u64, value: T, order: ByteOrder) -> AccessResult<()> {
        match self {
            // SAFETY: forwarded to the caller.
            Self::Scoped(memory) => Ok(unsafe { memory.set_value_unchecked(index as usize, value) }?),
            // SAFETY: forwarded to the caller.
            Self::Raw(memory) => Ok(unsafe { memory.set_value_unchecked(index as usize, value) }?),
            Self::Checked(backend) => Ok(backend.set_bytes(index, encode(value, order).as_ref())?),
        }
    }

    /// Reads `len` bytes at the access cursor.
    ///
    /// Generic backends read sequentially and track their own position;
    /// native memory is addressed at the cursor directly.
    pub(crate) fn read_bytes(&mut self, cursor: u64, len: usize) -> StorageResult<Vec<u8>> {
        match self {
            Self::Checked(backend) => backend.read_bytes(len),
            Self::Scoped(memory) => memory.get_bytes(cursor, len),
            Self::Raw(memory) => memory.get_bytes(cursor, len),
        }
    }

    /// Writes `data` at the access cursor.
    pub(crate) fn write_bytes(&mut self, cursor: u64, data: &[u8]) -> StorageResult<()> {
        match self {
            Self::Checked(backend) => backend.write_bytes(data),
            Self::Scoped(memory) => memory.set_bytes(cursor, data),
            Self::Raw(memory) => memory.set_bytes(cursor, data),
        }
    }

    /// Moves the backend position along with the access cursor.
    pub(crate) fn seek(&mut self, pos: u64) -> StorageResult<()> {
        match self {
            Self::Checked(backend) => backend.set_index(pos),
            Self::Scoped(_) | Self::Raw(_) => Ok(()),
        }
    }

    /// Skips `n` bytes at the backend.
    pub(crate) fn skip(&mut self, n: u64) -> StorageResult<()> {
        match self {
            Self::Checked(backend) => backend.skip(n),
            Self::Scoped(_) | Self::Raw(_) => Ok(()),
        }
    }

    /// Writes `len` copies of `byte` at the access cursor.
    pub(crate) fn fill(&mut self, cursor: u64, len: usize, byte: u8) -> StorageResult<()> {
        match self {
            Self::Scoped(memory) => memory.fill(cursor, len, byte),
            Self::Raw(memory) => memory.fill_range(cursor, len, byte),
            Self::Checked(backend) => backend.write_bytes(&vec![byte; len]),
        }
    }

    pub(crate) fn slice(&mut self, index: u64, len: u64) -> StorageResult<Self> {
        Ok(match self {
            Self::Scoped(memory) => Self::Scoped(memory.slice_scoped(index, len)?),
            Self::Raw(memory) => Self::Raw(memory.slice_raw(index, len)?),
            Self::Checked(backend) => Self::Checked(backend.slice(index, len)?),
        })
    }
}
