//! Error types for the access front-end.

use ioaccess_codec::CodecError;
use ioaccess_storage::StorageError;
use std::fmt;
use std::thread::ThreadId;
use thiserror::Error;

/// Result type for access operations.
pub type AccessResult<T> = Result<T, AccessError>;

/// The permission an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Reading bytes.
    Read,
    /// Writing bytes.
    Write,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Errors that can occur in access operations.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The calling thread is not the owner of the access.
    #[error("access owned by thread {owner:?}, called from {caller:?}")]
    Ownership {
        /// The owning thread.
        owner: ThreadId,
        /// The thread that made the call.
        caller: ThreadId,
    },

    /// The access, or the memory behind it, has been released.
    #[error("access has been released")]
    Released,

    /// The access lacks the permission the operation needs.
    #[error("access has no {required} permission")]
    Permission {
        /// The missing permission.
        required: Permission,
    },

    /// The operation would cross the declared length.
    #[error("out of bounds: {len} bytes at position {position}, length {length}")]
    Bounds {
        /// Position the operation starts at.
        position: u64,
        /// Number of bytes the operation spans.
        len: u64,
        /// Declared length of the access.
        length: u64,
    },

    /// The access or its backend does not support the operation.
    #[error("unsupported operation: {operation}")]
    Unsupported {
        /// Description of the operation.
        operation: String,
    },

    /// Encoded text does not fit the length prefix.
    #[error("encoded text is {len} bytes, prefix allows at most {max}")]
    EncodingTooLong {
        /// Encoded length in bytes.
        len: usize,
        /// Largest length the prefix can hold.
        max: usize,
    },

    /// Backend failure, including I/O errors.
    #[error("storage error: {0}")]
    Storage(StorageError),

    /// Codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl AccessError {
    /// Create an unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a permission error.
    pub fn permission(required: Permission) -> Self {
        Self::Permission { required }
    }
}

impl From<StorageError> for AccessError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unsupported { operation, backend } => Self::Unsupported {
                operation: format!("{operation} on {backend} backend"),
            },
            StorageError::NotReadable => Self::permission(Permission::Read),
            StorageError::NotWritable => Self::permission(Permission::Write),
            StorageError::Released | StorageError::ScopeClosed | StorageError::Freed => Self::Released,
            StorageError::OutOfRange { offset, len, size } => Self::Bounds {
                position: offset,
                len: len as u64,
                length: size,
            },
            other => Self::Storage(other),
        }
    }
}
