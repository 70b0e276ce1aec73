//! Payload and metadata types stored in the underlying layers
//!
//! The coordinator writes two kinds of entries into every layer: application
//! values, and per-key meta records that preserve the original intent of a
//! write so later sync-backs can reuse it. Both travel through the stores as
//! an opaque [`Payload`]; the coordinator is the only code that inspects the
//! variant.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Per-key bookkeeping record written alongside every cached value.
///
/// Records when the value was written and which TTL the caller originally
/// asked for. When a value is discovered in a deeper layer and copied back
/// into the layers that missed it, the recorded `requested_ttl` decides the
/// TTL of the copy instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Unix timestamp (seconds) of the write that produced this record
    pub created_at: u64,
    /// TTL the caller requested, `None` when no expiry was requested
    pub requested_ttl: Option<Duration>,
}

impl EntryMeta {
    /// Create a meta record stamped with the current wall-clock time
    pub fn new(requested_ttl: Option<Duration>) -> Self {
        Self {
            created_at: unix_now(),
            requested_ttl,
        }
    }

    /// Seconds elapsed since the recorded write
    pub fn age_seconds(&self) -> u64 {
        unix_now().saturating_sub(self.created_at)
    }
}

/// Entry stored in a layer: an application value or a companion meta record.
///
/// Stores hold payloads without interpreting them. Serde derives are provided
/// so persistent or remote store backends can round-trip payloads when `V`
/// supports it; in-memory backends need neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload<V> {
    /// Application value, passed through unchanged
    Value(V),
    /// Coordinator-owned meta record for a companion key
    Meta(EntryMeta),
}

impl<V> Payload<V> {
    /// Extract the application value, discarding meta payloads
    pub fn into_value(self) -> Option<V> {
        match self {
            Payload::Value(v) => Some(v),
            Payload::Meta(_) => None,
        }
    }

    /// Borrow the meta record if this payload is one
    pub fn as_meta(&self) -> Option<&EntryMeta> {
        match self {
            Payload::Value(_) => None,
            Payload::Meta(meta) => Some(meta),
        }
    }
}

/// Current wall-clock time as unix seconds
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
