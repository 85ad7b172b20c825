//! Error types for the Tempest pipeline
//!
//! Decode errors never escape the per-datagram boundary and encode
//! errors never escape the per-metric boundary; both are reported to
//! the diagnostics sink and the pipeline keeps running.

use thiserror::Error;

/// Result type alias for Tempest operations
pub type Result<T> = std::result::Result<T, TempestError>;

/// Main error type for Tempest operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TempestError {
    /// Decoding error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Encoding error
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
}

/// Errors while decoding a datagram
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Outer JSON invalid, or `type`/`serial_number` missing
    #[error("Malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    /// Envelope parsed but the kind-specific schema did not
    #[error("Malformed {kind} payload: {reason}")]
    TypedDecode { kind: &'static str, reason: String },
}

/// Errors while encoding a metric to line protocol
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// Encoded line exceeds the configured maximum
    #[error("Encoded line is {length} bytes, limit is {max}")]
    LineTooLong { length: usize, max: usize },

    /// Line protocol requires at least one field
    #[error("Metric '{name}' has no fields")]
    EmptyFieldSet { name: String },

    /// Measurement name is empty
    #[error("Metric has an empty measurement name")]
    EmptyMeasurement,
}
