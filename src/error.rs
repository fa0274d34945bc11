//! Error types for CREST
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::protocol::Algorithm;

/// Result type alias for CREST operations
pub type Result<T> = std::result::Result<T, CrestError>;

/// Main error type for CREST operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrestError {
    /// Estimation request error
    #[error("Estimate error: {0}")]
    Estimate(#[from] EstimateError),

    /// Ratio normalization error
    #[error("Normalize error: {0}")]
    Normalize(#[from] NormalizeError),

    /// External engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Errors in estimation requests
///
/// These are programmer errors in core usage and propagate to the caller
/// rather than being silently defaulted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// Requested algorithm set is empty
    #[error("Algorithm set is empty")]
    EmptyAlgorithmSet,

    /// Algorithm tag not in the closed set
    #[error("Unknown algorithm tag: {tag}")]
    UnknownAlgorithm { tag: String },

    /// Same algorithm requested twice
    #[error("Duplicate algorithm in request: {algorithm}")]
    DuplicateAlgorithm { algorithm: Algorithm },
}

/// Errors during ratio normalization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// Ratio is undefined for a zero-byte original
    #[error("Original size is zero, compression ratio is undefined")]
    ZeroOriginalSize,
}

/// Errors from the external compression engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Engine could not be reached at all
    #[error("Engine unreachable: {reason}")]
    Unreachable { reason: String },

    /// Request exceeded the configured timeout
    #[error("Engine request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Engine answered with a non-2xx status
    #[error("Engine returned HTTP status {status}")]
    Status { status: u16 },

    /// Response body missing required fields or inconsistent
    #[error("Malformed engine response: {reason}")]
    MalformedResponse { reason: String },

    /// Client could not be constructed from the configuration
    #[error("Invalid engine configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl EngineError {
    /// Whether the caller may recover by falling back to the estimator
    ///
    /// Everything except a configuration error is recoverable: the result
    /// of the fallback must then be marked as simulated.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::InvalidConfig { .. })
    }
}
