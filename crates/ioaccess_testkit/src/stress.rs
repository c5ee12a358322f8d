//! Stress tests for ioaccess.
//!
//! These tests verify behavior under heavy load and across thread handoffs.

use crate::fixtures::TestAccess;
use ioaccess_core::{Access, AccessError, BackendKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
    /// Size of each access in bytes.
    pub access_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            access_size: 4_096,
        }
    }
}

/// Writes `u64` values sequentially, wrapping with `flip` when full, then
/// reads each slot back by index.
pub fn stress_sequential_writes(kind: BackendKind, config: &StressConfig) -> StressTestResult {
    let mut access = TestAccess::of_kind(kind, config.access_size);
    let slots = (config.access_size / 8).max(1);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        if i % slots == 0 && access.flip().is_err() {
            failed += 1;
            continue;
        }
        match access.write_u64(i as u64) {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    // the last pass wrote slots 0..written
    let written = match config.operations % slots {
        0 if config.operations > 0 => slots,
        n => n,
    };
    let last_pass = config.operations - written;
    for slot in 0..written {
        match access.get_u64((slot * 8) as u64) {
            Ok(value) if value == (last_pass + slot) as u64 => successful += 1,
            _ => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

enum Hop {
    Ring(Arc<Vec<ThreadId>>),
    Token(Access),
    Stop,
}

/// Passes one access around a ring of threads. Each holder writes once,
/// hands ownership to the next thread, confirms it is now rejected itself,
/// and sends the access on.
pub fn stress_ownership_handoff(config: &StressConfig) -> StressTestResult {
    let threads = config.threads.max(2);
    let remaining = Arc::new(AtomicUsize::new(config.operations));
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let (senders, receivers): (Vec<_>, Vec<_>) = (0..threads).map(|_| mpsc::channel::<Hop>()).unzip();
    let start = Instant::now();

    let handles: Vec<_> = receivers
        .into_iter()
        .enumerate()
        .map(|(t, inbox)| {
            let next = senders[(t + 1) % threads].clone();
            let remaining = Arc::clone(&remaining);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);

            thread::spawn(move || {
                let Ok(Hop::Ring(ring)) = inbox.recv() else { return };
                let next_id = ring[(t + 1) % ring.len()];

                while let Ok(hop) = inbox.recv() {
                    let mut access = match hop {
                        Hop::Token(access) => access,
                        Hop::Ring(_) => continue,
                        Hop::Stop => {
                            let _ = next.send(Hop::Stop);
                            return;
                        }
                    };

                    let counter = if access.write_u32(t as u32).and_then(|()| access.flip()).is_ok() {
                        &successful
                    } else {
                        &failed
                    };
                    counter.fetch_add(1, Ordering::Relaxed);

                    if remaining.fetch_sub(1, Ordering::AcqRel) <= 1 {
                        let _ = access.release();
                        let _ = next.send(Hop::Stop);
                        return;
                    }

                    let handed = access.set_owner(Some(next_id)).is_ok()
                        && matches!(access.read_u32(), Err(AccessError::Ownership { .. }));
                    if !handed {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                    if next.send(Hop::Token(access)).is_err() {
                        return;
                    }
                }
            })
        })
        .collect();

    let ring: Arc<Vec<ThreadId>> = Arc::new(handles.iter().map(|h| h.thread().id()).collect());
    for sender in &senders {
        let _ = sender.send(Hop::Ring(Arc::clone(&ring)));
    }

    let mut access = Access::allocate(config.access_size.max(4));
    if config.operations > 0 && access.set_owner(Some(ring[0])).is_ok() {
        let _ = senders[0].send(Hop::Token(access));
    } else {
        let _ = senders[0].send(Hop::Stop);
    }
    drop(senders);

    for handle in handles {
        if handle.join().is_err() {
            failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Splits one scoped region into per-thread slices and writes them in
/// parallel, then checks every byte from the parent.
pub fn stress_parallel_slices(config: &StressConfig) -> StressTestResult {
    let threads = config.threads.max(1);
    let chunk = (config.access_size / threads).max(1);
    let start = Instant::now();

    let mut parent = match Access::scoped_memory(chunk * threads) {
        Ok(access) => access,
        Err(_) => return StressTestResult::new(0, 1, start.elapsed()),
    };

    let mut failed = 0usize;
    let mut slices = Vec::with_capacity(threads);
    for t in 0..threads {
        // workers claim their slice on arrival
        let released = parent
            .slice((t * chunk) as u64, chunk as u64)
            .and_then(|mut slice| slice.set_owner(None).map(|()| slice));
        match released {
            Ok(slice) => slices.push(slice),
            Err(_) => failed += 1,
        }
    }

    let ops_per_thread = config.operations / threads;
    let handles: Vec<_> = slices
        .into_iter()
        .enumerate()
        .map(|(t, mut slice)| {
            thread::spawn(move || {
                let mut ok = 0usize;
                let mut bad = 0usize;
                if slice.acquire_ownership().is_err() {
                    return (0, 1);
                }
                for _ in 0..ops_per_thread.max(1) {
                    let filled = slice.clear().and_then(|()| slice.fill(t as u8));
                    if filled.is_ok() {
                        ok += 1;
                    } else {
                        bad += 1;
                    }
                }
                (ok, bad)
            })
        })
        .collect();

    let mut successful = 0usize;
    for handle in handles {
        match handle.join() {
            Ok((ok, bad)) => {
                successful += ok;
                failed += bad;
            }
            Err(_) => failed += 1,
        }
    }

    for t in 0..threads {
        match parent.get_bytes((t * chunk) as u64, chunk) {
            Ok(bytes) if bytes.iter().all(|&b| b == t as u8) => successful += 1,
            _ => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_writes_every_kind() {
        let config = StressConfig {
            operations: 1_000,
            access_size: 256,
            ..Default::default()
        };

        for kind in crate::fixtures::BOUNDED_KINDS {
            let result = stress_sequential_writes(kind, &config);
            assert_eq!(result.failed_ops, 0, "{kind}");
            assert_eq!(result.successful_ops, 1_000 + 8);
        }
    }

    #[test]
    fn test_ownership_handoff() {
        let config = StressConfig {
            operations: 100,
            threads: 3,
            access_size: 16,
        };

        let result = stress_ownership_handoff(&config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 100);
    }

    #[test]
    fn test_parallel_slices() {
        let config = StressConfig {
            operations: 200,
            threads: 4,
            access_size: 1_024,
        };

        let result = stress_parallel_slices(&config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 200 + 4);
    }
}
