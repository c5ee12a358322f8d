//! Sequential stream storage backend.

use crate::backend::{BackendKind, StorageBackend};
use crate::error::{StorageError, StorageResult};
use std::fmt;
use std::io::{self, Read, Write};

/// A backend over an optional reader and an optional writer.
///
/// Streams have no addressable positions. Every indexed operation, including
/// `set_index` and `slice`, fails with [`StorageError::Unsupported`].
///
/// # Example
///
/// ```rust
/// use ioaccess_storage::{StorageBackend, StreamBackend};
///
/// let mut backend = StreamBackend::reader(&b"abc"[..]);
/// assert_eq!(backend.read_bytes(2).unwrap(), b"ab");
/// assert!(backend.write(1).is_err());
/// ```
pub struct StreamBackend {
    input: Option<Box<dyn Read + Send>>,
    output: Option<Box<dyn Write + Send>>,
}

impl StreamBackend {
    /// Creates a read-only stream backend.
    pub fn reader(input: impl Read + Send + 'static) -> Self {
        Self {
            input: Some(Box::new(input)),
            output: None,
        }
    }

    /// Creates a write-only stream backend.
    pub fn writer(output: impl Write + Send + 'static) -> Self {
        Self {
            input: None,
            output: Some(Box::new(output)),
        }
    }

    /// Creates a stream backend that reads from `input` and writes to `output`.
    pub fn duplex(input: impl Read + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self {
            input: Some(Box::new(input)),
            output: Some(Box::new(output)),
        }
    }

    /// Returns true if the backend has an input half.
    #[must_use]
    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    /// Returns true if the backend has an output half.
    #[must_use]
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    fn input(&mut self) -> StorageResult<&mut (dyn Read + Send + 'static)> {
        self.input.as_deref_mut().ok_or(StorageError::NotReadable)
    }

    fn output(&mut self) -> StorageResult<&mut (dyn Write + Send + 'static)> {
        self.output.as_deref_mut().ok_or(StorageError::NotWritable)
    }
}

impl fmt::Debug for StreamBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamBackend")
            .field("input", &self.input.is_some())
            .field("output", &self.output.is_some())
            .finish()
    }
}

impl StorageBackend for StreamBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Stream
    }

    fn set_index(&mut self, _pos: u64) -> StorageResult<()> {
        Err(StorageError::unsupported("set_index", BackendKind::Stream))
    }

    fn skip(&mut self, n: u64) -> StorageResult<()> {
        let skipped = io::copy(&mut self.input()?.take(n), &mut io::sink())?;
        if skipped < n {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream ended while skipping").into());
        }
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        if let Some(output) = self.output.as_mut() {
            output.flush()?;
        }
        Ok(())
    }

    fn release(&mut self) -> StorageResult<()> {
        self.input = None;
        if let Some(mut output) = self.output.take() {
            output.flush()?;
        }
        Ok(())
    }

    fn read(&mut self) -> StorageResult<u8> {
        let mut byte = [0u8; 1];
        self.input()?.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn read_bytes(&mut self, len: usize) -> StorageResult<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.input()?.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn get(&mut self, _index: u64) -> StorageResult<u8> {
        Err(StorageError::unsupported("get", BackendKind::Stream))
    }

    fn get_bytes(&mut self, _index: u64, _len: usize) -> StorageResult<Vec<u8>> {
        Err(StorageError::unsupported("get_bytes", BackendKind::Stream))
    }

    fn write(&mut self, byte: u8) -> StorageResult<()> {
        self.output()?.write_all(&[byte])?;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> StorageResult<()> {
        self.output()?.write_all(data)?;
        Ok(())
    }

    fn set(&mut self, _index: u64, _byte: u8) -> StorageResult<()> {
        Err(StorageError::unsupported("set", BackendKind::Stream))
    }

    fn set_bytes(&mut self, _index: u64, _data: &[u8]) -> StorageResult<()> {
        Err(StorageError::unsupported("set_bytes", BackendKind::Stream))
    }
}
