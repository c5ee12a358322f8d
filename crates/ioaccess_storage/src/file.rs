//! File-based storage backend.

use crate::backend::{BackendKind, StorageBackend};
use crate::error::{StorageError, StorageResult};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A random-access file backend.
///
/// Sequential operations use the file position. Indexed operations seek to
/// the index, perform the operation and seek back, so they never disturb
/// the sequential position.
///
/// # Thread Safety
///
/// The seek-operate-restore sequence is not atomic. A backend must not be
/// shared by concurrent users of the same file handle.
///
/// # Example
///
/// ```no_run
/// use ioaccess_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("data.bin"), true, true).unwrap();
/// backend.write_bytes(b"persistent data").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: Option<File>,
    readable: bool,
    writable: bool,
}

impl FileBackend {
    /// Opens a file backend with the given permissions.
    ///
    /// A writable backend creates the file if it does not exist. Existing
    /// contents are never truncated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path, read: bool, write: bool) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(read)
            .write(write)
            .create(write)
            .truncate(false)
            .open(path)?;

        debug!(path = %path.display(), read, write, "opened file backend");

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            readable: read,
            writable: write,
        })
    }

    /// Opens a file backend, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or file cannot be opened.
    pub fn open_with_create_dirs(path: &Path, read: bool, write: bool) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path, read, write)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current size of the file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is released or metadata is unavailable.
    pub fn size(&self) -> StorageResult<u64> {
        let file = self.file.as_ref().ok_or(StorageError::Released)?;
        Ok(file.metadata()?.len())
    }

    /// Syncs data and metadata to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    pub fn sync(&mut self) -> StorageResult<()> {
        self.file_mut()?.sync_all()?;
        Ok(())
    }

    fn file_mut(&mut self) -> StorageResult<&mut File> {
        self.file.as_mut().ok_or(StorageError::Released)
    }

    fn readable(&mut self) -> StorageResult<&mut File> {
        if !self.readable {
            return Err(StorageError::NotReadable);
        }
        self.file_mut()
    }

    fn writable(&mut self) -> StorageResult<&mut File> {
        if !self.writable {
            return Err(StorageError::NotWritable);
        }
        self.file_mut()
    }

    /// Runs `op` with the file positioned at `index`, then restores the position.
    fn at<T>(
        file: &mut File,
        index: u64,
        op: impl FnOnce(&mut File) -> io::Result<T>,
    ) -> StorageResult<T> {
        let restore = file.stream_position()?;
        file.seek(SeekFrom::Start(index))?;
        let result = op(file);
        file.seek(SeekFrom::Start(restore))?;
        Ok(result?)
    }
}

impl StorageBackend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    fn set_index(&mut self, pos: u64) -> StorageResult<()> {
        self.file_mut()?.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    fn skip(&mut self, n: u64) -> StorageResult<()> {
        let delta = i64::try_from(n).map_err(|_| {
            StorageError::Io(io::Error::new(io::ErrorKind::InvalidInput, "skip distance too large"))
        })?;
        self.file_mut()?.seek(SeekFrom::Current(delta))?;
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.file_mut()?.flush()?;
        Ok(())
    }

    fn release(&mut self) -> StorageResult<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            debug!(path = %self.path.display(), "released file backend");
        }
        Ok(())
    }

    fn read(&mut self) -> StorageResult<u8> {
        let mut byte = [0u8; 1];
        self.readable()?.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn read_bytes(&mut self, len: usize) -> StorageResult<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.readable()?.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn get(&mut self, index: u64) -> StorageResult<u8> {
        let mut byte = [0u8; 1];
        Self::at(self.readable()?, index, |f| f.read_exact(&mut byte))?;
        Ok(byte[0])
    }

    fn get_bytes(&mut self, index: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        Self::at(self.readable()?, index, |f| f.read_exact(&mut buffer))?;
        Ok(buffer)
    }

    fn write(&mut self, byte: u8) -> StorageResult<()> {
        self.writable()?.write_all(&[byte])?;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> StorageResult<()> {
        self.writable()?.write_all(data)?;
        Ok(())
    }

    fn set(&mut self, index: u64, byte: u8) -> StorageResult<()> {
        Self::at(self.writable()?, index, |f| f.write_all(&[byte]))
    }

    fn set_bytes(&mut self, index: u64, data: &[u8]) -> StorageResult<()> {
        Self::at(self.writable()?, index, |f| f.write_all(data))
    }
}
