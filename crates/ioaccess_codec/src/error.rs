//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input slice is shorter than the value being decoded.
    #[error("short input: expected {expected} bytes, got {actual}")]
    ShortInput {
        /// Number of bytes the value needs.
        expected: usize,
        /// Number of bytes that were available.
        actual: usize,
    },

    /// The output slice cannot hold the encoded value.
    #[error("short output: need {expected} bytes, have {actual}")]
    ShortOutput {
        /// Number of bytes the encoded value needs.
        expected: usize,
        /// Number of bytes available in the output.
        actual: usize,
    },
}

impl CodecError {
    /// Create a short input error.
    pub fn short_input(expected: usize, actual: usize) -> Self {
        Self::ShortInput { expected, actual }
    }

    /// Create a short output error.
    pub fn short_output(expected: usize, actual: usize) -> Self {
        Self::ShortOutput { expected, actual }
    }
}
