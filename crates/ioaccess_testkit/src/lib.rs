//! # ioaccess Testkit
//!
//! Test utilities for ioaccess.
//!
//! This crate provides:
//! - Fixtures that build an access of every backend kind
//! - An allocation-tracking raw allocator
//! - Property-based test generators using proptest
//! - Known-answer codec vectors
//! - Model-checked fuzz harnesses
//! - Stress testing utilities
//! - Tracing setup for tests
//!
//! ## Usage
//!
//! ```rust
//! use ioaccess_testkit::prelude::*;
//!
//! with_each_memory_kind(16, |access| {
//!     access.write_i32(-5).unwrap();
//!     assert_eq!(access.get_i32(0).unwrap(), -5);
//! });
//! ```

#![warn(missing_docs)]

pub mod allocator;
pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod logging;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::allocator::*;
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use allocator::*;
pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use logging::*;
pub use stress::*;
pub use vectors::*;
