//! Layered coordination core: fallback reads, sync-back, clamped writes
//!
//! [`LayerCoordinator`] owns the ordered layer list and implements the whole
//! coordination policy. Reads escalate from layer 0 toward the authoritative
//! layer and copy discovered values back into the layers that missed them.
//! Writes run the other way, authoritative layer first, so a partial failure
//! leaves the source of truth updated and the upper layers merely stale.
//! Staleness is repaired lazily by the next read's sync-back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::cache::config::LayerConfig;
use crate::cache::error::CacheOperationError;
use crate::cache::traits::{KeyDerivation, Store};
use crate::cache::types::{unix_now, EntryMeta, Payload};
use crate::telemetry::CacheStatistics;

/// One underlying store plus its TTL ceiling, identified by position in the
/// layer order. Layer 0 is the fastest and least authoritative; the last
/// layer is the source of truth.
pub struct Layer<V> {
    store: Arc<dyn Store<Payload<V>>>,
    config: LayerConfig,
}

impl<V> Layer<V> {
    /// Layer without a TTL ceiling
    pub fn new<S: Store<Payload<V>> + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
            config: LayerConfig::unbounded(),
        }
    }

    /// Layer whose entries never outlive `ceiling`
    pub fn with_ceiling<S: Store<Payload<V>> + 'static>(store: S, ceiling: Duration) -> Self {
        Self {
            store: Arc::new(store),
            config: LayerConfig::with_ceiling(ceiling),
        }
    }

    /// Layer over an already-shared store handle
    pub fn from_shared(store: Arc<dyn Store<Payload<V>>>, ceiling: Option<Duration>) -> Self {
        Self {
            store,
            config: LayerConfig { ceiling },
        }
    }

    /// The configured TTL ceiling, `None` when unbounded
    pub fn ceiling(&self) -> Option<Duration> {
        self.config.ceiling
    }
}

impl<V> std::fmt::Debug for Layer<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Coordinator over the ordered layer list.
///
/// Holds no cached data itself; all state lives in the stores plus the meta
/// records the coordinator writes into them. No internal locking: layer calls
/// are issued strictly sequentially and each store handles its own
/// concurrency.
pub(crate) struct LayerCoordinator<V> {
    layers: Vec<Layer<V>>,
    keys: Arc<dyn KeyDerivation>,
    stats: CacheStatistics,
}

impl<V> std::fmt::Debug for LayerCoordinator<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerCoordinator")
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl<V> LayerCoordinator<V> {
    pub(crate) fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl<V: Clone + Send + Sync + 'static> LayerCoordinator<V> {
    pub(crate) fn new(
        layers: Vec<Layer<V>>,
        keys: Arc<dyn KeyDerivation>,
    ) -> Result<Self, CacheOperationError> {
        if layers.is_empty() {
            return Err(CacheOperationError::invalid_layer(
                "at least one layer is required",
            ));
        }
        for (layer_index, layer) in layers.iter().enumerate() {
            layer.config.validate(layer_index)?;
        }
        let stats = CacheStatistics::with_layers(layers.len());
        Ok(Self {
            layers,
            keys,
            stats,
        })
    }

    pub(crate) fn statistics(&self) -> &CacheStatistics {
        &self.stats
    }

    /// Keys must be non-empty scalar identifiers outside the reserved meta
    /// namespace. Checked before any I/O.
    fn validate_key(&self, key: &str) -> Result<(), CacheOperationError> {
        if key.is_empty() {
            return Err(CacheOperationError::invalid_key(
                "cache keys must be non-empty",
            ));
        }
        if self.keys.is_meta_key(key) {
            return Err(CacheOperationError::invalid_key(format!(
                "key {:?} collides with the reserved meta-record namespace",
                key
            )));
        }
        Ok(())
    }

    /// TTL actually used for a write into `layer_index`.
    ///
    /// No requested TTL defers to the layer ceiling, as does a requested TTL
    /// of exactly zero: the zero case keeps the historical meaning of
    /// "no expiry requested" rather than "expire immediately". Otherwise the
    /// requested TTL is capped at the ceiling; a layer without a ceiling
    /// imposes no cap. Every write funnels through this one policy point.
    pub(crate) fn effective_ttl(
        &self,
        layer_index: usize,
        requested: Option<Duration>,
    ) -> Option<Duration> {
        let ceiling = self.layers[layer_index].config.ceiling;
        match requested {
            None => ceiling,
            Some(ttl) if ttl == Duration::ZERO => ceiling,
            Some(ttl) => match ceiling {
                Some(ceiling) => Some(ttl.min(ceiling)),
                None => Some(ttl),
            },
        }
    }

    /// Write values plus their companion meta records into a single layer in
    /// one batch. Shared by the write pipeline and read-time sync-back.
    fn write_layer(&self, layer_index: usize, entries: &HashMap<String, V>, meta: &EntryMeta) -> bool {
        let mut batch: HashMap<String, Payload<V>> = HashMap::with_capacity(entries.len() * 2);
        for (key, value) in entries {
            batch.insert(self.keys.meta_key(key), Payload::Meta(meta.clone()));
            batch.insert(key.clone(), Payload::Value(value.clone()));
        }
        let ttl = self.effective_ttl(layer_index, meta.requested_ttl);
        let accepted = self.layers[layer_index].store.set_multiple(batch, ttl);
        if !accepted {
            self.stats.layer(layer_index).record_write_failure();
        }
        accepted
    }

    /// Read a batch of keys with cross-layer fallback and sync-back.
    ///
    /// Walks layers in order, querying each for the keys (and companion meta
    /// keys) still unresolved. The first layer to produce a key wins; deeper
    /// layers are never consulted for it again. Once the walk ends, resolved
    /// values are copied back into every layer that was queried for them and
    /// missed, using the TTL the original write requested (from the meta
    /// record) clamped to each destination's ceiling. Sync-back is
    /// best-effort: a failed copy is logged and forgotten, and the next read
    /// simply repeats the fallback walk.
    ///
    /// The result maps every requested key exactly once, to `None` when no
    /// layer had it.
    pub(crate) fn batch_get(
        &self,
        keys: &[&str],
    ) -> Result<HashMap<String, Option<V>>, CacheOperationError> {
        for key in keys {
            self.validate_key(key)?;
        }

        // Dedupe while keeping first-seen order for the layer queries.
        let mut requested: Vec<String> = Vec::with_capacity(keys.len());
        for key in keys {
            if !requested.iter().any(|seen| seen == key) {
                requested.push((*key).to_string());
            }
        }

        // Meta keys ride along in the same batches; map them back to their
        // owning key when found.
        let mut meta_owner: HashMap<String, String> = HashMap::with_capacity(requested.len());
        let mut missing: Vec<String> = Vec::with_capacity(requested.len() * 2);
        for key in &requested {
            let meta_key = self.keys.meta_key(key);
            meta_owner.insert(meta_key.clone(), key.clone());
            missing.push(key.clone());
            missing.push(meta_key);
        }

        let mut found_values: HashMap<String, V> = HashMap::new();
        let mut found_meta: HashMap<String, EntryMeta> = HashMap::new();
        // Per layer: requested keys that layer was queried for and did not
        // have. Exactly these become sync-back targets once resolved.
        let mut missed: Vec<Vec<String>> = vec![Vec::new(); self.layers.len()];
        let mut deepest_queried = 0;

        let mut layer_index = 0;
        while !missing.is_empty() && layer_index < self.layers.len() {
            let layer = &self.layers[layer_index];
            let mut found = layer.store.get_multiple(&missing);
            deepest_queried = layer_index;

            for key in std::mem::take(&mut missing) {
                if let Some(owner) = meta_owner.get(&key) {
                    match found.remove(&key) {
                        Some(Payload::Meta(meta)) => {
                            found_meta.insert(owner.clone(), meta);
                        }
                        // A value payload under a meta key is corrupt;
                        // treat it as absent and keep looking deeper.
                        _ => missing.push(key),
                    }
                } else {
                    match found.remove(&key) {
                        Some(Payload::Value(value)) => {
                            self.stats.layer(layer_index).record_hit();
                            found_values.insert(key, value);
                        }
                        _ => {
                            self.stats.layer(layer_index).record_miss();
                            missed[layer_index].push(key.clone());
                            missing.push(key);
                        }
                    }
                }
            }

            layer_index += 1;
        }

        self.sync_back(deepest_queried, &missed, &found_values, &found_meta);

        Ok(requested
            .into_iter()
            .map(|key| {
                let value = found_values.get(&key).cloned();
                (key, value)
            })
            .collect())
    }

    /// Copy resolved values back into the layers that missed them, walking
    /// from the deepest layer queried up to layer 0.
    fn sync_back(
        &self,
        deepest_queried: usize,
        missed: &[Vec<String>],
        found_values: &HashMap<String, V>,
        found_meta: &HashMap<String, EntryMeta>,
    ) {
        if found_values.is_empty() {
            return;
        }
        for layer_index in (0..=deepest_queried).rev() {
            for key in &missed[layer_index] {
                let Some(value) = found_values.get(key) else {
                    continue;
                };
                // The original write's intent decides the TTL; without a
                // meta record the destination ceiling applies on its own.
                let requested_ttl = found_meta.get(key).and_then(|meta| meta.requested_ttl);
                let meta = EntryMeta {
                    created_at: unix_now(),
                    requested_ttl,
                };
                let mut entry = HashMap::with_capacity(1);
                entry.insert(key.clone(), value.clone());
                if self.write_layer(layer_index, &entry, &meta) {
                    self.stats.layer(layer_index).record_syncback();
                } else {
                    debug!(
                        "sync-back of {:?} into layer {} failed; next read will retry",
                        key, layer_index
                    );
                }
            }
        }
    }

    /// Write a batch through every layer, authoritative layer first.
    ///
    /// Each layer receives the values plus one shared meta record, with the
    /// requested TTL clamped to that layer's ceiling. The pipeline stops at
    /// the first layer that rejects the batch (upper layers are left stale
    /// rather than inconsistent with the source of truth) and the overall
    /// result is `true` only when every layer accepted. No rollback.
    pub(crate) fn batch_put(
        &self,
        entries: HashMap<String, V>,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheOperationError> {
        for key in entries.keys() {
            self.validate_key(key)?;
        }
        if entries.is_empty() {
            return Ok(true);
        }

        let meta = EntryMeta::new(ttl);
        for layer_index in (0..self.layers.len()).rev() {
            if !self.write_layer(layer_index, &entries, &meta) {
                warn!(
                    "layer {} rejected a write batch of {} entries; layers above it were not written",
                    layer_index,
                    entries.len()
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Strict containment: true only when every layer independently holds
    /// the key. Deliberately not the fallback semantics of reads.
    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.layers.iter().all(|layer| layer.store.has(key))
    }

    /// Remove a key from every layer, authoritative layer first.
    ///
    /// Unlike writes, removal continues through failures (every layer gets
    /// its chance) and the results are AND-folded. The companion meta
    /// record is left behind.
    pub(crate) fn remove(&self, key: &str) -> bool {
        let mut removed = true;
        for (layer_index, layer) in self.layers.iter().enumerate().rev() {
            let accepted = layer.store.delete(key);
            if !accepted {
                debug!("layer {} failed to delete {:?}", layer_index, key);
            }
            removed &= accepted;
        }
        removed
    }

    /// Remove a batch of keys from every layer, authoritative layer first,
    /// continuing through failures.
    pub(crate) fn batch_remove(&self, keys: &[&str]) -> bool {
        let keys: Vec<String> = keys.iter().map(|key| (*key).to_string()).collect();
        let mut removed = true;
        for (layer_index, layer) in self.layers.iter().enumerate().rev() {
            let accepted = layer.store.delete_multiple(&keys);
            if !accepted {
                debug!("layer {} failed to delete a batch of {} keys", layer_index, keys.len());
            }
            removed &= accepted;
        }
        removed
    }

    /// Clear every layer, authoritative layer first, continuing through
    /// failures.
    pub(crate) fn clear(&self) -> bool {
        let mut cleared = true;
        for (layer_index, layer) in self.layers.iter().enumerate().rev() {
            let accepted = layer.store.clear();
            if !accepted {
                debug!("layer {} failed to clear", layer_index);
            }
            cleared &= accepted;
        }
        cleared
    }
}
