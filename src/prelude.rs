//! Layercache prelude - convenient imports for users
//!
//! This module provides everything users need to compose and drive a layered
//! cache.

// Re-export the public API
pub use crate::layercache::{LayerCache, LayerCacheBuilder};

// Re-export essential error types that users might need
pub use crate::cache::error::CacheOperationError;

// Re-export the traits store implementations satisfy
pub use crate::cache::traits::{KeyDerivation, Store, SuffixDerivation};

// Re-export the types that travel through stores
pub use crate::cache::types::{EntryMeta, Payload};

// Re-export layer construction and statistics types
pub use crate::cache::config::LayerConfig;
pub use crate::cache::coordinator::Layer;
pub use crate::telemetry::{CacheStatsSnapshot, LayerStatsSnapshot};

// Re-export the bundled in-memory backend
pub use crate::store::MemoryStore;
