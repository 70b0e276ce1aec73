//! Layercache - layered read-through/write-through cache coordination
//!
//! Composes an ordered sequence of independent key-value stores into a
//! single cache facade, using faster/closer stores to absorb reads that
//! would otherwise hit a slower/authoritative store.
//!
//! # Features
//!
//! - **Fallback reads**: layer 0 is queried first, deeper layers only on
//!   miss; the first layer to produce a key wins
//! - **Sync-back**: values discovered in deeper layers are copied back into
//!   every layer that missed them, reusing the TTL of the original write
//! - **Authoritative-first writes**: writes start at the deepest layer, so a
//!   partial failure leaves the source of truth updated and upper layers
//!   merely stale
//! - **Per-layer TTL ceilings**: each layer clamps requested TTLs to its own
//!   configured maximum
//! - **Best-effort consistency**: no transactions, no rollback; staleness is
//!   repaired lazily by the next read
//! - **Pluggable stores**: anything satisfying the [`Store`](traits::Store)
//!   contract can be a layer

// Public API modules
pub mod layercache;
pub mod prelude;

// Coordination internals - traits are public for user store implementations
pub mod cache;
pub mod store;
pub mod telemetry;

// Re-export the public API at the crate root for convenience
pub use layercache::{LayerCache, LayerCacheBuilder};
pub use prelude::*;

// Public traits and types that store implementations need
pub mod traits {
    pub use crate::cache::traits::{KeyDerivation, Store, SuffixDerivation, DEFAULT_META_SUFFIX};
    pub use crate::cache::types::{EntryMeta, Payload};
}
