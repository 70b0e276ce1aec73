//! Error types for cache coordination operations
//!
//! Construction and key validation are the only paths that surface errors to
//! callers. Store I/O failures are absorbed into boolean results instead; a
//! lost cached copy is always recoverable from a deeper layer.

/// Errors surfaced by the cache coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOperationError {
    /// A layer failed construction-time validation. Fatal to construction;
    /// no partial cache is produced.
    InvalidLayer(String),
    /// A key is not a valid scalar identifier (empty, or inside the reserved
    /// meta-record namespace).
    InvalidKey(String),
}

impl CacheOperationError {
    /// Create an invalid-layer error with a descriptive message
    pub fn invalid_layer(msg: impl Into<String>) -> Self {
        CacheOperationError::InvalidLayer(msg.into())
    }

    /// Create an invalid-key error with a descriptive message
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        CacheOperationError::InvalidKey(msg.into())
    }
}

impl std::fmt::Display for CacheOperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheOperationError::InvalidLayer(msg) => write!(f, "Invalid layer: {}", msg),
            CacheOperationError::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
        }
    }
}

impl std::error::Error for CacheOperationError {}
