//! # ioaccess Storage
//!
//! The backend contract and every storage backend behind an ioaccess
//! `Access`.
//!
//! Backends are **unvalidated byte stores**: they do what they are asked
//! where the storage physically allows it. Permissions, declared lengths
//! and thread ownership are enforced by the front-end above them.
//!
//! ## Available Backends
//!
//! - [`HeapBackend`] - Shared heap buffer
//! - [`FileBackend`] - Random-access file using OS file APIs
//! - [`StreamBackend`] - Optional reader plus optional writer
//! - [`ScopedMemory`] - Aligned native allocation, file mapping or foreign
//!   address, bound to a [`Scope`]
//! - [`RawMemory`] - Raw block from a [`RawAllocator`], with tracked slices
//!
//! ## Example
//!
//! ```rust
//! use ioaccess_storage::{HeapBackend, StorageBackend};
//!
//! let mut backend = HeapBackend::new(11);
//! backend.write_bytes(b"hello world").unwrap();
//! let data = backend.get_bytes(6, 5).unwrap();
//! assert_eq!(&data, b"world");
//! ```

#![warn(missing_docs)]

mod allocator;
mod backend;
mod error;
mod file;
mod heap;
mod raw;
mod region;
mod scoped;
mod stream;

pub use allocator::{RawAllocator, SystemAllocator, RAW_ALIGNMENT};
pub use backend::{BackendKind, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use heap::HeapBackend;
pub use raw::RawMemory;
pub use scoped::{MapMode, Scope, ScopedMemory, DEFAULT_ALIGNMENT};
pub use stream::StreamBackend;
