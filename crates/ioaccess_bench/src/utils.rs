//! Benchmark utilities.

use ioaccess_core::{Access, BackendKind};
use rand::Rng;
use tempfile::TempDir;

/// Generate random data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` random offsets where a `width`-byte value fits in `size` bytes.
pub fn random_offsets(count: usize, size: usize, width: usize) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    let max = size.saturating_sub(width);
    (0..count).map(|_| rng.gen_range(0..=max) as u64).collect()
}

/// Generate a batch of random `u64` values.
pub fn random_u64s(count: usize) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| rng.gen()).collect()
}

/// Creates an access of `kind` over `size` bytes.
///
/// File accesses need the returned directory kept alive.
pub fn bench_access(kind: BackendKind, size: usize) -> (Access, Option<TempDir>) {
    match kind {
        BackendKind::Scoped => (Access::scoped_memory(size).unwrap(), None),
        BackendKind::Raw => (Access::raw(size).unwrap(), None),
        BackendKind::File => {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("bench.bin");
            std::fs::write(&path, vec![0u8; size]).unwrap();
            (Access::random_access(&path, true, true).unwrap(), Some(dir))
        }
        _ => (Access::allocate(size), None),
    }
}
