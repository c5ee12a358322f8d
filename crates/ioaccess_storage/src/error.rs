//! Error types for storage operations.

use crate::backend::BackendKind;
use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to access bytes outside the backend's region.
    #[error("out of range: offset {offset}, len {len}, size {size}")]
    OutOfRange {
        /// The requested offset.
        offset: u64,
        /// The requested length.
        len: usize,
        /// The size of the region.
        size: u64,
    },

    /// The backend does not implement this operation.
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        /// Name of the rejected operation.
        operation: &'static str,
        /// The backend that rejected it.
        backend: BackendKind,
    },

    /// The backend has no input to read from.
    #[error("backend is not readable")]
    NotReadable,

    /// The backend has no output to write to, or its memory is read-only.
    #[error("backend is not writable")]
    NotWritable,

    /// The backend has been released.
    #[error("backend has been released")]
    Released,

    /// The scope owning the memory region has been closed.
    #[error("memory scope is closed")]
    ScopeClosed,

    /// The raw allocation behind this backend has been freed.
    #[error("raw memory has been freed")]
    Freed,

    /// The requested size and alignment do not form a valid layout.
    #[error("invalid layout: size {size}, alignment {alignment}")]
    InvalidLayout {
        /// Requested size in bytes.
        size: usize,
        /// Requested alignment in bytes.
        alignment: usize,
    },

    /// The allocator could not provide memory.
    #[error("allocation of {size} bytes failed")]
    AllocationFailed {
        /// Requested size in bytes.
        size: usize,
    },
}

impl StorageError {
    /// Create an unsupported operation error.
    pub fn unsupported(operation: &'static str, backend: BackendKind) -> Self {
        Self::Unsupported { operation, backend }
    }

    /// Create an out of range error.
    pub fn out_of_range(offset: u64, len: usize, size: usize) -> Self {
        Self::OutOfRange {
            offset,
            len,
            size: size as u64,
        }
    }

    /// Returns true if the error means the backing memory is gone.
    #[must_use]
    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released | Self::ScopeClosed | Self::Freed)
    }
}
