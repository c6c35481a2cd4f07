//! Error types for relay operations.
//!
//! The append/flush hot path never fails: a missing consumer is a silent no-op.
//! Errors only surface at the edges, when decoding a buffer image or reading a
//! replay trace.

use thiserror::Error;

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors that can occur outside the append/flush path
#[derive(Error, Debug)]
pub enum RelayError {
    /// Not enough bytes left to decode a full record
    #[error("truncated record: need {expected} bytes, have {actual}")]
    TruncatedRecord {
        /// Bytes required for one record
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Buffer image length is not a whole number of records
    #[error("buffer image of {0} bytes is not a multiple of the record size")]
    MisalignedImage(usize),

    /// Malformed replay trace line
    #[error("trace line {line}: {source}")]
    Trace {
        /// 1-based line number
        line: usize,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Returns true if this error came from decoding buffer bytes
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::TruncatedRecord { .. } | Self::MisalignedImage(_))
    }
}
