//! Shared helpers for the ioaccess benchmarks.

pub mod utils;
