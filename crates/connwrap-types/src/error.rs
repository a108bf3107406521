//! Error types for stored connection handling.

use thiserror::Error;

/// Result type alias using the connection error type.
pub type Result<T> = std::result::Result<T, ConnectionError>;

/// Errors raised while decoding or looking up stored connections.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection extra is not valid JSON: {0}")]
    InvalidExtra(#[source] serde_json::Error),

    #[error("connection extra must be a JSON object, got {found}")]
    ExtraNotObject { found: &'static str },

    #[error("invalid connection URI: {reason}")]
    InvalidUri { reason: String },

    #[error("invalid connection definition for '{conn_id}': {source}")]
    InvalidDefinition {
        conn_id: String,
        source: serde_json::Error,
    },

    /// Backend failure reported by a [`ConnectionStore`](crate::ConnectionStore)
    /// implementation, as opposed to a missing connection.
    #[error("connection store error: {0}")]
    Store(String),
}
