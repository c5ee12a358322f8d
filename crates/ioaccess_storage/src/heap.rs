//! Heap buffer storage backend.

use crate::backend::{BackendKind, StorageBackend};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::ops::Range;
use std::sync::Arc;

/// A heap byte buffer backend.
///
/// The buffer is shared between a backend and every slice taken from it, so
/// a slice is a window onto the same bytes rather than a copy.
///
/// # Thread Safety
///
/// The buffer sits behind a lock, so slices handed to other threads see
/// consistent bytes.
///
/// # Example
///
/// ```rust
/// use ioaccess_storage::{HeapBackend, StorageBackend};
///
/// let mut backend = HeapBackend::new(8);
/// backend.write_bytes(b"hi").unwrap();
/// assert_eq!(backend.get_bytes(0, 2).unwrap(), b"hi");
/// ```
#[derive(Debug)]
pub struct HeapBackend {
    data: Option<Arc<RwLock<Vec<u8>>>>,
    start: usize,
    len: usize,
    pos: usize,
}

impl HeapBackend {
    /// Creates a zero-filled buffer of `size` bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_data(vec![0; size])
    }

    /// Creates a backend over existing bytes.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        let len = data.len();
        Self {
            data: Some(Arc::new(RwLock::new(data))),
            start: 0,
            len,
            pos: 0,
        }
    }

    /// Returns a copy of the bytes in this backend's window.
    ///
    /// Returns an empty vector once released.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data
            .as_ref()
            .map(|buffer| buffer.read()[self.start..self.start + self.len].to_vec())
            .unwrap_or_default()
    }

    /// Returns the size of this backend's window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn buffer(&self) -> StorageResult<&Arc<RwLock<Vec<u8>>>> {
        self.data.as_ref().ok_or(StorageError::Released)
    }

    /// Maps a window-relative span to a range in the shared buffer.
    fn span(&self, offset: u64, len: usize) -> StorageResult<Range<usize>> {
        let begin = usize::try_from(offset)
            .ok()
            .filter(|begin| begin.checked_add(len).is_some_and(|end| end <= self.len))
            .ok_or_else(|| StorageError::out_of_range(offset, len, self.len))?;
        Ok(self.start + begin..self.start + begin + len)
    }
}

impl StorageBackend for HeapBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Heap
    }

    fn set_index(&mut self, pos: u64) -> StorageResult<()> {
        self.span(pos, 0)?;
        self.pos = pos as usize;
        Ok(())
    }

    fn skip(&mut self, n: u64) -> StorageResult<()> {
        let len = usize::try_from(n).map_err(|_| StorageError::out_of_range(n, 0, self.len))?;
        self.span(self.pos as u64, len)?;
        self.pos += len;
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        // Heap buffer has no pending writes
        Ok(())
    }

    fn release(&mut self) -> StorageResult<()> {
        self.data = None;
        self.pos = 0;
        Ok(())
    }

    fn read(&mut self) -> StorageResult<u8> {
        let byte = self.get(self.pos as u64)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> StorageResult<Vec<u8>> {
        let bytes = self.get_bytes(self.pos as u64, len)?;
        self.pos += len;
        Ok(bytes)
    }

    fn get(&mut self, index: u64) -> StorageResult<u8> {
        let range = self.span(index, 1)?;
        Ok(self.buffer()?.read()[range.start])
    }

    fn get_bytes(&mut self, index: u64, len: usize) -> StorageResult<Vec<u8>> {
        let range = self.span(index, len)?;
        Ok(self.buffer()?.read()[range].to_vec())
    }

    fn write(&mut self, byte: u8) -> StorageResult<()> {
        self.set(self.pos as u64, byte)?;
        self.pos += 1;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> StorageResult<()> {
        self.set_bytes(self.pos as u64, data)?;
        self.pos += data.len();
        Ok(())
    }

    fn set(&mut self, index: u64, byte: u8) -> StorageResult<()> {
        let range = self.span(index, 1)?;
        self.buffer()?.write()[range.start] = byte;
        Ok(())
    }

    fn set_bytes(&mut self, index: u64, data: &[u8]) -> StorageResult<()> {
        let range = self.span(index, data.len())?;
        self.buffer()?.write()[range].copy_from_slice(data);
        Ok(())
    }

    fn can_slice(&self) -> bool {
        true
    }

    fn slice(&mut self, index: u64, len: u64) -> StorageResult<Box<dyn StorageBackend>> {
        let len = usize::try_from(len).map_err(|_| StorageError::out_of_range(index, 0, self.len))?;
        let range = self.span(index, len)?;
        Ok(Box::new(Self {
            data: Some(Arc::clone(self.buffer()?)),
            start: range.start,
            len,
            pos: 0,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_new_is_zeroed() {
        let backend = HeapBackend::new(4);
        assert_eq!(backend.len(), 4);
        assert_eq!(backend.data(), vec![0; 4]);
    }

    #[test]
    fn heap_sequential_write_then_indexed_read() {
        let mut backend = HeapBackend::new(8);
        backend.write(1).unwrap();
        backend.write_bytes(&[2, 3, 4]).unwrap();

        assert_eq!(backend.get(0).unwrap(), 1);
        assert_eq!(backend.get_bytes(1, 3).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn heap_indexed_ops_leave_position() {
        let mut backend = HeapBackend::with_data(b"abcdef".to_vec());
        backend.set(5, b'z').unwrap();
        backend.set_bytes(0, b"xy").unwrap();

        assert_eq!(backend.read().unwrap(), b'x');
        assert_eq!(backend.read_bytes(2).unwrap(), b"yc");
        assert_eq!(backend.data(), b"xycdez");
    }

    #[test]
    fn heap_read_past_end_fails() {
        let mut backend = HeapBackend::new(2);
        backend.skip(1).unwrap();
        let result = backend.read_bytes(2);
        assert!(matches!(result, Err(StorageError::OutOfRange { .. })));
    }

    #[test]
    fn heap_set_index_bounds() {
        let mut backend = HeapBackend::new(3);
        assert!(backend.set_index(3).is_ok());
        assert!(backend.set_index(4).is_err());
    }

    #[test]
    fn heap_slice_shares_bytes() {
        let mut backend = HeapBackend::with_data(b"0123456789".to_vec());
        let mut slice = backend.slice(2, 4).unwrap();

        assert_eq!(slice.read_bytes(4).unwrap(), b"2345");
        slice.set(0, b'X').unwrap();
        assert_eq!(backend.get(2).unwrap(), b'X');

        let result = slice.get(4);
        assert!(matches!(result, Err(StorageError::OutOfRange { .. })));
    }

    #[test]
    fn heap_slice_of_slice() {
        let mut backend = HeapBackend::with_data(b"abcdefgh".to_vec());
        let mut outer = backend.slice(1, 6).unwrap();
        let mut inner = outer.slice(2, 2).unwrap();
        assert_eq!(inner.read_bytes(2).unwrap(), b"de");
    }

    #[test]
    fn heap_release_detaches() {
        let mut backend = HeapBackend::new(4);
        let mut slice = backend.slice(0, 2).unwrap();
        backend.release().unwrap();

        assert!(matches!(backend.get(0), Err(StorageError::Released)));
        assert!(backend.data().is_empty());
        // slices keep the shared buffer alive
        assert_eq!(slice.get(1).unwrap(), 0);
    }

    #[test]
    fn heap_buffered_copy() {
        let mut source = HeapBackend::with_data(b"hello".to_vec());
        let mut target = HeapBackend::new(5);
        target.copy_from_at(&mut source, 0, 1, 4).unwrap();
        assert_eq!(target.data(), b"ello\0");
    }

    #[test]
    fn heap_flush_succeeds() {
        let mut backend = HeapBackend::new(1);
        assert!(backend.flush().is_ok());
    }
}
