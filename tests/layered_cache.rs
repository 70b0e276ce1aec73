//! Read-path behavior through the public API: fallback, sync-back,
//! first-found-wins, defaults, and the TTL policy observable from outside.

mod common;

use std::sync::Arc;
use std::time::Duration;

use layercache::prelude::*;
use layercache::traits::Store;

use common::FailingStore;

type PayloadStore = MemoryStore<Payload<String>>;

fn two_layers() -> (Arc<PayloadStore>, Arc<PayloadStore>, LayerCache<String>) {
    let l0 = Arc::new(PayloadStore::new());
    let l1 = Arc::new(PayloadStore::new());
    let cache = LayerCache::builder()
        .shared_layer(l0.clone(), Some(Duration::from_secs(2)))
        .shared_layer(l1.clone(), Some(Duration::from_secs(10)))
        .build()
        .expect("two valid layers");
    (l0, l1, cache)
}

#[test]
fn fallback_finds_values_in_deeper_layers_and_syncs_back() {
    let (l0, l1, cache) = two_layers();

    // Value present only in the authoritative layer.
    l1.set("key-1", Payload::Value("value-1".to_string()), None);
    assert!(!l0.has("key-1"));

    assert_eq!(cache.get("key-1"), Ok(Some("value-1".to_string())));

    // Sync-back copied the value into the layer that missed it.
    assert_eq!(
        l0.get("key-1").and_then(Payload::into_value),
        Some("value-1".to_string())
    );
}

#[test]
fn mixed_hit_and_miss_batch_syncs_back_with_ceiling_ttl() {
    let (l0, l1, cache) = two_layers();
    l1.set("key-1", Payload::Value("value-1".to_string()), None);

    let results = cache.batch_get(&["key-1", "missing-1"]).expect("valid keys");
    assert_eq!(results.len(), 2);
    assert_eq!(results.get("key-1"), Some(&Some("value-1".to_string())));
    assert_eq!(results.get("missing-1"), Some(&None));

    // Layer 0 now holds the value, clamped to its own 2s ceiling: the seeded
    // entry carried no meta record, so the destination ceiling applies.
    assert_eq!(
        l0.get("key-1").and_then(Payload::into_value),
        Some("value-1".to_string())
    );
    let remaining = l0.ttl_remaining("key-1").expect("clamped deadline");
    assert!(remaining <= Duration::from_secs(2));
    assert!(remaining > Duration::from_millis(500));
}

#[test]
fn first_found_wins_across_layers() {
    let (l0, l1, cache) = two_layers();

    l0.set("shared", Payload::Value("fast-copy".to_string()), None);
    l1.set("shared", Payload::Value("authoritative-copy".to_string()), None);
    l0.set("local-only", Payload::Value("local".to_string()), None);
    l1.set("deep-only", Payload::Value("deep".to_string()), None);

    let results = cache
        .batch_get(&["shared", "local-only", "deep-only"])
        .expect("valid keys");
    assert_eq!(results.get("shared"), Some(&Some("fast-copy".to_string())));
    assert_eq!(results.get("local-only"), Some(&Some("local".to_string())));
    assert_eq!(results.get("deep-only"), Some(&Some("deep".to_string())));

    // Resolving deep-only from layer 1 must not disturb layer 0's own
    // distinct copy of shared.
    assert_eq!(
        l0.get("shared").and_then(Payload::into_value),
        Some("fast-copy".to_string())
    );
    // And deep-only was synced back into layer 0.
    assert_eq!(
        l0.get("deep-only").and_then(Payload::into_value),
        Some("deep".to_string())
    );
}

#[test]
fn syncback_reuses_the_requested_ttl_from_the_meta_record() {
    let (l0, _l1, cache) = two_layers();

    // Written through the cache: layer 1 holds value + meta with the 1s
    // request. Wipe layer 0 to force a fallback.
    assert_eq!(
        cache.put("k", "v".to_string(), Some(Duration::from_secs(1))),
        Ok(true)
    );
    l0.clear();

    assert_eq!(cache.get("k"), Ok(Some("v".to_string())));
    // The sync-back copy honors the original 1s request, not the 2s ceiling.
    let remaining = l0.ttl_remaining("k").expect("deadline from meta");
    assert!(remaining <= Duration::from_secs(1));
}

#[test]
fn default_substitution_preserves_the_key_set() {
    let (_l0, l1, cache) = two_layers();
    l1.set("present", Payload::Value("yes".to_string()), None);

    let results = cache
        .batch_get_or(&["present", "absent-1", "absent-2"], "fallback".to_string())
        .expect("valid keys");
    assert_eq!(results.len(), 3);
    assert_eq!(results.get("present"), Some(&"yes".to_string()));
    assert_eq!(results.get("absent-1"), Some(&"fallback".to_string()));
    assert_eq!(results.get("absent-2"), Some(&"fallback".to_string()));
}

#[test]
fn repeated_reads_are_idempotent() {
    let (_l0, l1, cache) = two_layers();
    l1.set("key-1", Payload::Value("value-1".to_string()), None);

    let first = cache.batch_get(&["key-1", "missing-1"]).expect("valid keys");
    let after_first = cache.stats();
    let second = cache.batch_get(&["key-1", "missing-1"]).expect("valid keys");
    let after_second = cache.stats();

    assert_eq!(first, second);
    // The first read synced key-1 into layer 0; the second hit layer 0
    // directly and wrote nothing new.
    assert_eq!(after_first.layers[0].syncback_writes, 1);
    assert_eq!(after_second.layers[0].syncback_writes, 1);
    assert_eq!(after_second.layers[0].hits, after_first.layers[0].hits + 1);
}

#[test]
fn contains_key_requires_every_layer() {
    let (l0, l1, cache) = two_layers();

    l1.set("deep", Payload::Value("v".to_string()), None);
    assert!(!cache.contains_key("deep"));

    l0.set("deep", Payload::Value("v".to_string()), None);
    assert!(cache.contains_key("deep"));

    assert!(!cache.contains_key("nowhere"));
}

#[test]
fn no_ttl_request_uses_each_layer_ceiling() {
    let (l0, l1, cache) = two_layers();
    assert_eq!(cache.put("k", "v".to_string(), None), Ok(true));

    let fast = l0.ttl_remaining("k").expect("layer 0 ceiling applies");
    assert!(fast <= Duration::from_secs(2));
    let deep = l1.ttl_remaining("k").expect("layer 1 ceiling applies");
    assert!(deep <= Duration::from_secs(10));
    assert!(deep > Duration::from_secs(5));
}

#[test]
fn requested_ttl_is_clamped_per_layer() {
    let (l0, l1, cache) = two_layers();
    assert_eq!(
        cache.put("k", "v".to_string(), Some(Duration::from_secs(6))),
        Ok(true)
    );

    // Layer 0 clamps 6s to its 2s ceiling; layer 1's 10s ceiling lets it
    // through unchanged.
    assert!(l0.ttl_remaining("k").expect("clamped") <= Duration::from_secs(2));
    let deep = l1.ttl_remaining("k").expect("unclamped");
    assert!(deep <= Duration::from_secs(6));
    assert!(deep > Duration::from_secs(4));
}

#[test]
fn zero_ttl_keeps_the_historical_use_the_ceiling_meaning() {
    let (l0, _l1, cache) = two_layers();
    assert_eq!(cache.put("k", "v".to_string(), Some(Duration::ZERO)), Ok(true));

    // Not expired immediately; the layer ceiling applied instead.
    assert_eq!(cache.get("k"), Ok(Some("v".to_string())));
    assert!(l0.ttl_remaining("k").expect("ceiling applied") <= Duration::from_secs(2));
}

#[test]
fn zero_ttl_on_an_unbounded_layer_never_expires() {
    let store = Arc::new(PayloadStore::new());
    let cache: LayerCache<String> = LayerCache::builder()
        .shared_layer(store.clone(), None)
        .build()
        .expect("valid layer");

    assert_eq!(cache.put("k", "v".to_string(), Some(Duration::ZERO)), Ok(true));
    assert_eq!(store.ttl_remaining("k"), None);
    assert_eq!(cache.get("k"), Ok(Some("v".to_string())));
}

#[test]
fn syncback_failure_is_absorbed() {
    let l1 = Arc::new(PayloadStore::new());
    let cache: LayerCache<String> = LayerCache::builder()
        .layer(FailingStore)
        .shared_layer(l1.clone(), None)
        .build()
        .expect("valid layers");

    l1.set("k", Payload::Value("v".to_string()), None);

    // The broken fast layer neither serves the read nor accepts the
    // sync-back; the caller still gets the value, twice.
    assert_eq!(cache.get("k"), Ok(Some("v".to_string())));
    assert_eq!(cache.get("k"), Ok(Some("v".to_string())));

    let stats = cache.stats();
    assert_eq!(stats.layers[0].syncback_writes, 0);
    assert_eq!(stats.layers[0].write_failures, 2);
    assert_eq!(stats.layers[1].hits, 2);
}

#[test]
fn reserved_namespace_keys_are_rejected() {
    let (_l0, _l1, cache) = two_layers();
    assert!(matches!(
        cache.get("anything::meta"),
        Err(CacheOperationError::InvalidKey(_))
    ));
    assert!(matches!(
        cache.put("anything::meta", "v".to_string(), None),
        Err(CacheOperationError::InvalidKey(_))
    ));
    assert!(matches!(
        cache.get(""),
        Err(CacheOperationError::InvalidKey(_))
    ));
}

#[test]
fn custom_key_derivation_moves_the_reserved_namespace() {
    let cache: LayerCache<String> = LayerCache::builder()
        .layer(PayloadStore::new())
        .key_derivation(SuffixDerivation::new("!m"))
        .build()
        .expect("valid layer");

    // The default suffix is no longer reserved; the custom one is.
    assert_eq!(cache.put("key::meta", "v".to_string(), None), Ok(true));
    assert!(matches!(
        cache.put("key!m", "v".to_string(), None),
        Err(CacheOperationError::InvalidKey(_))
    ));
}
