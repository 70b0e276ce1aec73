//! Capability traits at the coordination seams
//!
//! [`Store`] is the uniform key-value contract every layer must satisfy;
//! [`KeyDerivation`] is the injectable namespace rule that keeps coordinator
//! meta records out of the application key space. Both are object-safe so
//! heterogeneous backends can sit behind `Arc<dyn _>` in a single layer list.

use std::collections::HashMap;
use std::time::Duration;

/// Reserved suffix used by [`SuffixDerivation::default`]
pub const DEFAULT_META_SUFFIX: &str = "::meta";

/// Uniform key-value capability contract satisfied by every layer.
///
/// `T` is the stored entry type; the coordinator instantiates stores with
/// [`Payload<V>`](crate::cache::types::Payload) so values and meta records
/// share one store.
///
/// Stores fold their own I/O failures into the return values: a failed read
/// is an absent entry, a failed write or delete is `false`. The coordinator
/// never sees a store error as anything richer, and treats a hung store as
/// the caller's problem to bound (wrap the store with a timeout before
/// handing it in).
pub trait Store<T>: Send + Sync {
    /// Look up a single entry
    fn get(&self, key: &str) -> Option<T>;

    /// Look up a batch of entries; absent keys are omitted from the result
    fn get_multiple(&self, keys: &[String]) -> HashMap<String, T> {
        keys.iter()
            .filter_map(|key| self.get(key).map(|value| (key.clone(), value)))
            .collect()
    }

    /// Write a single entry with an optional TTL
    fn set(&self, key: &str, value: T, ttl: Option<Duration>) -> bool;

    /// Write a batch of entries sharing one TTL; `true` only if the whole
    /// batch was accepted
    fn set_multiple(&self, items: HashMap<String, T>, ttl: Option<Duration>) -> bool {
        items
            .into_iter()
            .map(|(key, value)| self.set(&key, value, ttl))
            .fold(true, |acc, ok| acc & ok)
    }

    /// Whether the store currently holds the key
    fn has(&self, key: &str) -> bool;

    /// Remove a single entry; removing an absent key is a success
    fn delete(&self, key: &str) -> bool;

    /// Remove a batch of entries; `true` only if every removal succeeded
    fn delete_multiple(&self, keys: &[String]) -> bool {
        keys.iter()
            .map(|key| self.delete(key))
            .fold(true, |acc, ok| acc & ok)
    }

    /// Drop every entry held by the store
    fn clear(&self) -> bool;
}

/// Derivation rule mapping an application key to its companion meta key.
///
/// The derived namespace must be disjoint from application keys; the
/// coordinator rejects application keys for which [`is_meta_key`] reports
/// `true` before performing any I/O.
///
/// [`is_meta_key`]: KeyDerivation::is_meta_key
pub trait KeyDerivation: Send + Sync {
    /// Companion meta key for an application key
    fn meta_key(&self, key: &str) -> String;

    /// Whether a key lies inside the reserved meta namespace
    fn is_meta_key(&self, key: &str) -> bool;
}

/// Default meta-key derivation: a fixed reserved suffix.
#[derive(Debug, Clone)]
pub struct SuffixDerivation {
    suffix: String,
}

impl SuffixDerivation {
    /// Derivation using a caller-chosen suffix
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// The reserved suffix
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for SuffixDerivation {
    fn default() -> Self {
        Self::new(DEFAULT_META_SUFFIX)
    }
}

impl KeyDerivation for SuffixDerivation {
    fn meta_key(&self, key: &str) -> String {
        format!("{}{}", key, self.suffix)
    }

    fn is_meta_key(&self, key: &str) -> bool {
        key.ends_with(&self.suffix)
    }
}
