//! Storage backend trait definition.

use crate::error::{StorageError, StorageResult};
use ioaccess_codec::ByteOrder;
use std::fmt;

/// Identifies the kind of storage behind a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// A heap byte buffer.
    Heap,
    /// A random-access file.
    File,
    /// A sequential input and/or output stream.
    Stream,
    /// Natively allocated or mapped memory bound to a scope.
    Scoped,
    /// Raw unmanaged memory addressed by pointer.
    Raw,
    /// A backend implemented outside this crate.
    Custom,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Heap => "heap",
            Self::File => "file",
            Self::Stream => "stream",
            Self::Scoped => "scoped",
            Self::Raw => "raw",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A byte-level storage backend for ioaccess.
///
/// Backends are **unvalidated byte stores**. They perform whatever operation
/// they are asked to, where the underlying storage supports it. Permission,
/// ownership and declared-length checks are the job of the front-end that
/// wraps them; a backend only refuses what it physically cannot do.
///
/// # Cursor
///
/// Every backend keeps its own sequential position. `read*`, `write*`,
/// `skip` and the sequential `copy_from*` variants advance it; indexed
/// operations (`get*`, `set*`, `copy_from_at`) leave it untouched.
///
/// # Implementors
///
/// - [`super::HeapBackend`] - Shared heap buffer
/// - [`super::FileBackend`] - Random-access file
/// - [`super::StreamBackend`] - Reader/writer pair
/// - [`super::ScopedMemory`] - Scoped native or mapped memory
/// - [`super::RawMemory`] - Raw pointer memory
pub trait StorageBackend: Send {
    /// Returns the kind of storage behind this backend.
    fn kind(&self) -> BackendKind {
        BackendKind::Custom
    }

    /// Moves the sequential position to `pos`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is not positionable or `pos` is
    /// outside its region.
    fn set_index(&mut self, pos: u64) -> StorageResult<()>;

    /// Advances the sequential position by `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be skipped.
    fn skip(&mut self, n: u64) -> StorageResult<()>;

    /// Pushes buffered writes to the underlying storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Releases the underlying storage.
    ///
    /// # Errors
    ///
    /// Returns an error if closing the storage fails.
    fn release(&mut self) -> StorageResult<()>;

    /// Reads one byte at the sequential position.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte cannot be read.
    fn read(&mut self) -> StorageResult<u8>;

    /// Reads `len` bytes at the sequential position.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be read.
    fn read_bytes(&mut self, len: usize) -> StorageResult<Vec<u8>>;

    /// Reads the byte at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is not indexed or the read fails.
    fn get(&mut self, index: u64) -> StorageResult<u8>;

    /// Reads `len` bytes starting at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is not indexed or the read fails.
    fn get_bytes(&mut self, index: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Writes one byte at the sequential position.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte cannot be written.
    fn write(&mut self, byte: u8) -> StorageResult<()>;

    /// Writes `data` at the sequential position.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be written.
    fn write_bytes(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Writes `byte` at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is not indexed or the write fails.
    fn set(&mut self, index: u64, byte: u8) -> StorageResult<()>;

    /// Writes `data` starting at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is not indexed or the write fails.
    fn set_bytes(&mut self, index: u64, data: &[u8]) -> StorageResult<()>;

    /// Copies `len` bytes from `source` at `offset` into this backend at `index`.
    ///
    /// The default implementation reads through an intermediate buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if either side fails.
    fn copy_from_at(
        &mut self,
        source: &mut dyn StorageBackend,
        index: u64,
        offset: u64,
        len: usize,
    ) -> StorageResult<()> {
        let data = source.get_bytes(offset, len)?;
        self.set_bytes(index, &data)
    }

    /// Copies `len` bytes from `source` at `offset` to the sequential position.
    ///
    /// # Errors
    ///
    /// Returns an error if either side fails.
    fn copy_from_offset(
        &mut self,
        source: &mut dyn StorageBackend,
        offset: u64,
        len: usize,
    ) -> StorageResult<()> {
        let data = source.get_bytes(offset, len)?;
        self.write_bytes(&data)
    }

    /// Copies `len` bytes from the sequential position of `source` to the
    /// sequential position of this backend. Both positions advance.
    ///
    /// # Errors
    ///
    /// Returns an error if either side fails.
    fn copy_from(&mut self, source: &mut dyn StorageBackend, len: usize) -> StorageResult<()> {
        let data = source.read_bytes(len)?;
        self.write_bytes(&data)
    }

    /// Returns true if [`slice`](Self::slice) is supported.
    fn can_slice(&self) -> bool {
        false
    }

    /// Creates a backend over `len` bytes starting at `index`, sharing storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unsupported`] unless the backend can slice.
    fn slice(&mut self, index: u64, len: u64) -> StorageResult<Box<dyn StorageBackend>> {
        let _ = (index, len);
        Err(StorageError::unsupported("slice", self.kind()))
    }

    /// Sets the byte order used by backends that encode typed values themselves.
    fn set_byte_order(&mut self, order: ByteOrder) {
        let _ = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A minimal backend that only supports sequential bytes.
    struct Tape {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl StorageBackend for Tape {
        fn set_index(&mut self, pos: u64) -> StorageResult<()> {
            self.pos = pos as usize;
            Ok(())
        }
        fn skip(&mut self, n: u64) -> StorageResult<()> {
            self.pos += n as usize;
            Ok(())
        }
        fn flush(&mut self) -> StorageResult<()> {
            Ok(())
        }
        fn release(&mut self) -> StorageResult<()> {
            Ok(())
        }
        fn read(&mut self) -> StorageResult<u8> {
            self.pos += 1;
            Ok(self.bytes[self.pos - 1])
        }
        fn read_bytes(&mut self, len: usize) -> StorageResult<Vec<u8>> {
            self.pos += len;
            Ok(self.bytes[self.pos - len..self.pos].to_vec())
        }
        fn get(&mut self, index: u64) -> StorageResult<u8> {
            Ok(self.bytes[index as usize])
        }
        fn get_bytes(&mut self, index: u64, len: usize) -> StorageResult<Vec<u8>> {
            let start = index as usize;
            Ok(self.bytes[start..start + len].to_vec())
        }
        fn write(&mut self, byte: u8) -> StorageResult<()> {
            self.bytes.push(byte);
            Ok(())
        }
        fn write_bytes(&mut self, data: &[u8]) -> StorageResult<()> {
            self.bytes.extend_from_slice(data);
            Ok(())
        }
        fn set(&mut self, index: u64, byte: u8) -> StorageResult<()> {
            self.bytes[index as usize] = byte;
            Ok(())
        }
        fn set_bytes(&mut self, index: u64, data: &[u8]) -> StorageResult<()> {
            let start = index as usize;
            self.bytes[start..start + data.len()].copy_from_slice(data);
            Ok(())
        }
    }

    #[test]
    fn defaults_are_conservative() {
        let mut tape = Tape { bytes: vec![], pos: 0 };
        assert_eq!(tape.kind(), BackendKind::Custom);
        assert!(!tape.can_slice());
        let result = tape.slice(0, 0);
        assert!(matches!(
            result,
            Err(StorageError::Unsupported { operation: "slice", backend: BackendKind::Custom })
        ));
    }

    #[test]
    fn default_copies_are_buffered() {
        let mut source = Tape { bytes: b"abcdef".to_vec(), pos: 0 };
        let mut target = Tape { bytes: vec![0; 4], pos: 0 };

        target.copy_from_at(&mut source, 1, 2, 3).unwrap();
        assert_eq!(target.bytes, b"\0cde");

        target.copy_from(&mut source, 2).unwrap();
        assert_eq!(source.pos, 2);
        assert_eq!(target.bytes, b"\0cdeab");

        target.copy_from_offset(&mut source, 5, 1).unwrap();
        assert_eq!(target.bytes, b"\0cdeabf");
    }

    #[test]
    fn kind_display() {
        assert_eq!(BackendKind::Scoped.to_string(), "scoped");
        assert_eq!(BackendKind::Raw.to_string(), "raw");
    }
}
