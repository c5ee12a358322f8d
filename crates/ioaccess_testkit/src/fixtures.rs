//! Test fixtures for every backend kind.
//!
//! Provides accesses that clean up after themselves, and helpers that run
//! the same test body over each kind.

use ioaccess_core::{Access, AccessOptions, BackendKind, MapMode};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Backend kinds that support indexed access with a declared length.
pub const BOUNDED_KINDS: [BackendKind; 4] = [
    BackendKind::Heap,
    BackendKind::Scoped,
    BackendKind::Raw,
    BackendKind::File,
];

/// An access with automatic cleanup of any files it uses.
pub struct TestAccess {
    /// The access instance.
    pub access: Access,
    /// The kind requested.
    pub kind: BackendKind,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestAccess {
    /// Creates a heap-backed access of `size` bytes.
    pub fn heap(size: usize) -> Self {
        Self {
            access: Access::allocate(size),
            kind: BackendKind::Heap,
            _temp_dir: None,
        }
    }

    /// Creates a scoped native access of `size` bytes.
    pub fn scoped(size: usize) -> Self {
        Self {
            access: Access::scoped_memory(size).expect("Failed to allocate scoped memory"),
            kind: BackendKind::Scoped,
            _temp_dir: None,
        }
    }

    /// Creates a raw memory access of `size` bytes.
    pub fn raw(size: usize) -> Self {
        Self {
            access: Access::raw(size).expect("Failed to allocate raw memory"),
            kind: BackendKind::Raw,
            _temp_dir: None,
        }
    }

    /// Creates a file-backed access over a zeroed file of `size` bytes.
    ///
    /// Unlike [`Access::random_access`], the access has a declared length
    /// so bounds behave like the memory kinds.
    pub fn file(size: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("access.bin");
        std::fs::write(&path, vec![0u8; size]).expect("Failed to create backing file");

        let access = Access::random_access_with(&path, AccessOptions::new().length(Some(size as u64)))
            .expect("Failed to open file access");

        Self {
            access,
            kind: BackendKind::File,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Creates a read-write mapping over a zeroed file of `size` bytes.
    pub fn mapped(size: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("mapped.bin");
        std::fs::write(&path, vec![0u8; size]).expect("Failed to create backing file");

        let access = Access::map_file(&path, 0, size, MapMode::ReadWrite).expect("Failed to map file");

        Self {
            access,
            kind: BackendKind::Scoped,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Creates an access of the given kind.
    ///
    /// # Panics
    ///
    /// Panics for kinds without a fixed size, such as streams.
    pub fn of_kind(kind: BackendKind, size: usize) -> Self {
        match kind {
            BackendKind::Heap => Self::heap(size),
            BackendKind::Scoped => Self::scoped(size),
            BackendKind::Raw => Self::raw(size),
            BackendKind::File => Self::file(size),
            other => panic!("no sized fixture for {other} backend"),
        }
    }

    /// Returns the backing file path, if any.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|dir| match self.kind {
            BackendKind::File => dir.path().join("access.bin"),
            _ => dir.path().join("mapped.bin"),
        })
    }

    /// Returns the temporary directory, if any.
    pub fn dir(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }
}

impl std::ops::Deref for TestAccess {
    type Target = Access;

    fn deref(&self) -> &Self::Target {
        &self.access
    }
}

impl std::ops::DerefMut for TestAccess {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.access
    }
}

/// Runs `f` once for each bounded backend kind, with a fresh access of
/// `size` bytes.
///
/// # Example
///
/// ```rust
/// use ioaccess_testkit::with_each_kind;
///
/// with_each_kind(8, |access| {
///     access.write_u32(7).unwrap();
///     assert_eq!(access.get_u32(0).unwrap(), 7);
/// });
/// ```
pub fn with_each_kind<F>(size: usize, mut f: F)
where
    F: FnMut(&mut TestAccess),
{
    for kind in BOUNDED_KINDS {
        let mut test_access = TestAccess::of_kind(kind, size);
        f(&mut test_access);
    }
}

/// Runs `f` once for each in-memory kind: heap, scoped and raw.
pub fn with_each_memory_kind<F>(size: usize, mut f: F)
where
    F: FnMut(&mut TestAccess),
{
    for kind in [BackendKind::Heap, BackendKind::Scoped, BackendKind::Raw] {
        let mut test_access = TestAccess::of_kind(kind, size);
        f(&mut test_access);
    }
}
