//! Error types for the session core

use thiserror::Error;

/// Result type alias for session core operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by the session core's own surface (cache and config I/O).
///
/// Identity-provider failures travel separately as
/// [`ProviderError`](crate::provider::ProviderError); the store swallows
/// those by policy and only logs them.
#[derive(Error, Debug)]
pub enum SessionError {
    /// File I/O failed while reading or writing locally persisted state
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The platform configuration directory could not be resolved
    #[error("configuration error: {0}")]
    Config(String),
}
