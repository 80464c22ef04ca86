//! Shared error types for Ecotrack

use thiserror::Error;

/// Crate-wide error type
///
/// The emissions engine never produces errors (malformed input degrades to
/// zero contributions); this type covers the serving and auth boundaries.
#[derive(Debug, Error)]
pub enum EcotrackError {
    /// Authentication or token validation failure
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid startup configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Underlying I/O failure (listener bind, connection accept)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode failure at the HTTP boundary
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
