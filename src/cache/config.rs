//! Layer configuration and construction-time validation
//!
//! All validation happens before a cache instance exists; no I/O is performed
//! at construction.

use std::time::Duration;

use crate::cache::error::CacheOperationError;

/// Per-layer policy configuration.
///
/// The ceiling is the maximum lifetime the layer allows for any entry,
/// regardless of the TTL a caller requested. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerConfig {
    /// Maximum TTL enforced on every write into this layer
    pub ceiling: Option<Duration>,
}

impl LayerConfig {
    /// Configuration with no TTL ceiling
    pub fn unbounded() -> Self {
        Self { ceiling: None }
    }

    /// Configuration with the given TTL ceiling
    pub fn with_ceiling(ceiling: Duration) -> Self {
        Self {
            ceiling: Some(ceiling),
        }
    }

    /// Ceilings must be positive; zero would make every write into the layer
    /// dead on arrival.
    pub(crate) fn validate(&self, layer_index: usize) -> Result<(), CacheOperationError> {
        if self.ceiling == Some(Duration::ZERO) {
            return Err(CacheOperationError::invalid_layer(format!(
                "layer {} has a zero TTL ceiling; ceilings must be positive",
                layer_index
            )));
        }
        Ok(())
    }
}

/// Pad a ceilings list out to `layer_count`, treating missing entries as
/// unbounded. A longer list is truncated to the layer count.
pub(crate) fn padded_configs(
    layer_count: usize,
    ceilings: Vec<Option<Duration>>,
) -> Vec<LayerConfig> {
    let mut configs: Vec<LayerConfig> = ceilings
        .into_iter()
        .take(layer_count)
        .map(|ceiling| LayerConfig { ceiling })
        .collect();
    configs.resize(layer_count, LayerConfig::unbounded());
    configs
}
