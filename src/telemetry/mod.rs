//! Per-layer cache statistics with atomic counters
//!
//! Pure observation: the coordinator records hits, misses, sync-back writes
//! and absorbed write failures as it works, and callers take point-in-time
//! snapshots. Nothing here feeds back into coordination decisions.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

/// Live counters for a single layer.
#[derive(Debug, Default)]
pub struct LayerStatistics {
    hits: CachePadded<AtomicU64>,
    misses: CachePadded<AtomicU64>,
    syncback_writes: CachePadded<AtomicU64>,
    write_failures: CachePadded<AtomicU64>,
}

impl LayerStatistics {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_syncback(&self) {
        self.syncback_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> LayerStatsSnapshot {
        LayerStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            syncback_writes: self.syncback_writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Live counters for every layer of a cache instance.
#[derive(Debug, Default)]
pub struct CacheStatistics {
    layers: Vec<LayerStatistics>,
}

impl CacheStatistics {
    pub(crate) fn with_layers(layer_count: usize) -> Self {
        Self {
            layers: (0..layer_count).map(|_| LayerStatistics::default()).collect(),
        }
    }

    pub(crate) fn layer(&self, layer_index: usize) -> &LayerStatistics {
        &self.layers[layer_index]
    }

    /// Point-in-time copy across all layers
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            layers: self.layers.iter().map(LayerStatistics::snapshot).collect(),
        }
    }
}

/// Frozen per-layer counter values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerStatsSnapshot {
    /// Requested keys this layer resolved
    pub hits: u64,
    /// Requested keys this layer was queried for and did not have
    pub misses: u64,
    /// Values copied into this layer by read-time sync-back
    pub syncback_writes: u64,
    /// Write batches this layer rejected (absorbed, never escalated)
    pub write_failures: u64,
}

impl LayerStatsSnapshot {
    /// Fraction of lookups against this layer that hit (0.0 when idle)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Frozen counters for every layer, index-aligned with the layer order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    /// Per-layer snapshots, layer 0 first
    pub layers: Vec<LayerStatsSnapshot>,
}

impl CacheStatsSnapshot {
    /// Hits summed across all layers
    pub fn total_hits(&self) -> u64 {
        self.layers.iter().map(|l| l.hits).sum()
    }

    /// Misses summed across all layers
    pub fn total_misses(&self) -> u64 {
        self.layers.iter().map(|l| l.misses).sum()
    }

    /// Hit ratio across all layers combined
    pub fn overall_hit_ratio(&self) -> f64 {
        let hits = self.total_hits();
        let total = hits + self.total_misses();
        if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        }
    }
}
