//! Simple public API for the layered cache coordinator
//!
//! [`LayerCache`] composes an ordered sequence of independent key-value
//! stores into a single cache facade. Reads hit layer 0 first and escalate
//! toward the last (authoritative) layer only on miss, copying discovered
//! values back into the layers that missed them. Writes run authoritative
//! layer first so partial failures never leave the source of truth behind.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::coordinator::{Layer, LayerCoordinator};
use crate::cache::error::CacheOperationError;
use crate::cache::traits::{KeyDerivation, Store, SuffixDerivation};
use crate::cache::types::Payload;
use crate::telemetry::CacheStatsSnapshot;

/// Layered cache facade over pluggable store backends.
///
/// Holds no data itself; all state lives in the underlying stores plus the
/// per-key meta records the coordinator writes into them. Cloning is cheap:
/// clones share the coordinator through an `Arc` and operate on the same
/// layers.
pub struct LayerCache<V> {
    coordinator: Arc<LayerCoordinator<V>>,
}

impl<V> Clone for LayerCache<V> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
        }
    }
}

impl<V> std::fmt::Debug for LayerCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerCache")
            .field("layers", &self.coordinator.layer_count())
            .finish()
    }
}

impl<V: Clone + Send + Sync + 'static> LayerCache<V> {
    /// Start building a cache layer by layer
    pub fn builder() -> LayerCacheBuilder<V> {
        LayerCacheBuilder::new()
    }

    /// Build directly from parallel store and ceiling lists.
    ///
    /// A ceilings list shorter than the store list is padded with unbounded
    /// entries.
    pub fn with_layers(
        stores: Vec<Arc<dyn Store<Payload<V>>>>,
        ceilings: Vec<Option<Duration>>,
    ) -> Result<Self, CacheOperationError> {
        let configs = crate::cache::config::padded_configs(stores.len(), ceilings);
        let layers = stores
            .into_iter()
            .zip(configs)
            .map(|(store, config)| Layer::from_shared(store, config.ceiling))
            .collect();
        Self::from_layers(layers, Arc::new(SuffixDerivation::default()))
    }

    fn from_layers(
        layers: Vec<Layer<V>>,
        keys: Arc<dyn KeyDerivation>,
    ) -> Result<Self, CacheOperationError> {
        Ok(Self {
            coordinator: Arc::new(LayerCoordinator::new(layers, keys)?),
        })
    }

    /// Look up a key, falling back through the layers in order.
    ///
    /// Returns the value from the lowest-indexed layer that has it, `None`
    /// when no layer does. A hit in a deeper layer is copied back into every
    /// layer above it before returning.
    pub fn get(&self, key: &str) -> Result<Option<V>, CacheOperationError> {
        let mut results = self.coordinator.batch_get(&[key])?;
        Ok(results.remove(key).flatten())
    }

    /// [`get`](Self::get) with a fallback value for a full miss
    pub fn get_or(&self, key: &str, default: V) -> Result<V, CacheOperationError> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Look up a batch of keys with cross-layer fallback and sync-back.
    ///
    /// The result maps every requested key exactly once; keys no layer had
    /// map to `None`.
    pub fn batch_get(&self, keys: &[&str]) -> Result<HashMap<String, Option<V>>, CacheOperationError> {
        self.coordinator.batch_get(keys)
    }

    /// [`batch_get`](Self::batch_get) substituting `default` for misses
    pub fn batch_get_or(
        &self,
        keys: &[&str],
        default: V,
    ) -> Result<HashMap<String, V>, CacheOperationError> {
        Ok(self
            .coordinator
            .batch_get(keys)?
            .into_iter()
            .map(|(key, value)| (key, value.unwrap_or_else(|| default.clone())))
            .collect())
    }

    /// Write a value through every layer, authoritative layer first.
    ///
    /// `ttl` is clamped to each layer's ceiling independently; `None`
    /// requests no expiry (each layer's ceiling still applies). Returns
    /// `Ok(true)` only when every layer accepted the write.
    pub fn put(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<bool, CacheOperationError> {
        let mut entries = HashMap::with_capacity(1);
        entries.insert(key.to_string(), value);
        self.coordinator.batch_put(entries, ttl)
    }

    /// Write a batch through every layer, authoritative layer first.
    ///
    /// The pipeline stops at the first layer that rejects the batch and
    /// reports `Ok(false)`; layers already written are not rolled back. The
    /// read path repairs the resulting staleness lazily.
    pub fn batch_put(
        &self,
        entries: Vec<(String, V)>,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheOperationError> {
        self.coordinator.batch_put(entries.into_iter().collect(), ttl)
    }

    /// Strict containment check: true only when every layer independently
    /// holds the key. This is intentionally not the fallback semantics of
    /// [`get`](Self::get).
    pub fn contains_key(&self, key: &str) -> bool {
        self.coordinator.contains_key(key)
    }

    /// Remove a key from every layer, authoritative layer first, continuing
    /// through failures. Returns the conjunction of the per-layer results.
    ///
    /// The key's companion meta record is left in place; it expires with its
    /// own TTL or is overwritten by the next put.
    pub fn remove(&self, key: &str) -> bool {
        self.coordinator.remove(key)
    }

    /// Remove a batch of keys from every layer, authoritative layer first,
    /// continuing through failures
    pub fn batch_remove(&self, keys: &[&str]) -> bool {
        self.coordinator.batch_remove(keys)
    }

    /// Clear every layer, authoritative layer first, continuing through
    /// failures
    pub fn clear(&self) -> bool {
        self.coordinator.clear()
    }

    /// Number of configured layers
    pub fn layer_count(&self) -> usize {
        self.coordinator.layer_count()
    }

    /// Point-in-time per-layer statistics
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.coordinator.statistics().snapshot()
    }
}

/// Fluent builder assembling the layer order.
///
/// Layers are queried for reads in the order they are added; the last layer
/// added is the authoritative one and is written first.
pub struct LayerCacheBuilder<V> {
    layers: Vec<Layer<V>>,
    keys: Arc<dyn KeyDerivation>,
}

impl<V: Clone + Send + Sync + 'static> LayerCacheBuilder<V> {
    /// Builder with no layers and the default meta-key derivation
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            keys: Arc::new(SuffixDerivation::default()),
        }
    }

    /// Append a layer without a TTL ceiling
    pub fn layer<S: Store<Payload<V>> + 'static>(mut self, store: S) -> Self {
        self.layers.push(Layer::new(store));
        self
    }

    /// Append a layer whose entries never outlive `ceiling`
    pub fn layer_with_ceiling<S: Store<Payload<V>> + 'static>(
        mut self,
        store: S,
        ceiling: Duration,
    ) -> Self {
        self.layers.push(Layer::with_ceiling(store, ceiling));
        self
    }

    /// Append a layer over an already-shared store handle
    pub fn shared_layer(
        mut self,
        store: Arc<dyn Store<Payload<V>>>,
        ceiling: Option<Duration>,
    ) -> Self {
        self.layers.push(Layer::from_shared(store, ceiling));
        self
    }

    /// Replace the meta-key derivation rule
    pub fn key_derivation<D: KeyDerivation + 'static>(mut self, keys: D) -> Self {
        self.keys = Arc::new(keys);
        self
    }

    /// Validate the layer list and produce the cache.
    ///
    /// Fails with [`CacheOperationError::InvalidLayer`] when no layers were
    /// added or a ceiling is zero. Performs no I/O.
    pub fn build(self) -> Result<LayerCache<V>, CacheOperationError> {
        LayerCache::from_layers(self.layers, self.keys)
    }
}

impl<V: Clone + Send + Sync + 'static> Default for LayerCacheBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}
