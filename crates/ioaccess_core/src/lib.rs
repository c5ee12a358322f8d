//! # ioaccess Core
//!
//! The [`Access`] front-end: typed, permission-checked and bounds-checked
//! byte I/O over any storage backend.
//!
//! This crate provides:
//! - Constructors for heap, file, stream, scoped native and raw memory
//! - Sequential and indexed typed accessors under a chosen [`ByteOrder`]
//! - Plain and length-prefixed strings in several [`TextEncoding`]s
//! - 128-bit identifiers
//! - Slicing, bulk copies, fill and clear
//! - Single-thread ownership and release-once semantics
//!
//! ## Example
//!
//! ```rust
//! use ioaccess_core::{Access, ByteOrder, TextEncoding};
//!
//! let mut access = Access::scoped_memory(64).unwrap();
//! access.set_byte_order(ByteOrder::LittleEndian).unwrap();
//! access.write_u16(7).unwrap();
//! access.write_string_byte("hello", TextEncoding::Utf8).unwrap();
//! access.flip().unwrap();
//!
//! assert_eq!(access.read_u16().unwrap(), 7);
//! assert_eq!(access.read_string_byte(TextEncoding::Utf8).unwrap(), "hello");
//! access.release().unwrap();
//! ```

#![warn(missing_docs)]

mod access;
mod config;
mod error;
mod ownership;

pub use access::Access;
pub use config::AccessOptions;
pub use error::{AccessError, AccessResult, Permission};

pub use ioaccess_codec::{ByteOrder, Primitive, TextEncoding};
pub use ioaccess_storage::{
    BackendKind, FileBackend, HeapBackend, MapMode, RawAllocator, StorageBackend, StorageError, StreamBackend,
    SystemAllocator,
};
pub use uuid::Uuid;
