//! Layercache API walk-through
//!
//! Demonstrates construction, layered reads with sync-back, TTL clamping,
//! batch operations and statistics against two in-memory layers.

use std::sync::Arc;
use std::time::Duration;

use layercache::prelude::*;
use layercache::traits::Store;

type PayloadStore = MemoryStore<Payload<String>>;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("Layercache base operations");
    println!("==========================\n");

    // Two layers: a fast local one with a tight ceiling in front of an
    // authoritative one. Shared handles let us inspect each layer directly.
    let fast = Arc::new(PayloadStore::new());
    let authoritative = Arc::new(PayloadStore::new());
    let cache: LayerCache<String> = LayerCache::builder()
        .shared_layer(fast.clone(), Some(Duration::from_secs(2)))
        .shared_layer(authoritative.clone(), Some(Duration::from_secs(10)))
        .build()?;
    println!("✓ built a {}-layer cache", cache.layer_count());

    // Write-through: both layers receive the value, each under its own
    // clamped TTL.
    cache.put("greeting", "hello".to_string(), Some(Duration::from_secs(30)))?;
    println!(
        "✓ put() - fast layer TTL {:?}, authoritative layer TTL {:?}",
        fast.ttl_remaining("greeting"),
        authoritative.ttl_remaining("greeting")
    );

    // Fallback read: seed only the authoritative layer, then watch the read
    // pull the value forward.
    authoritative.set("deep", Payload::Value("found below".to_string()), None);
    let value = cache.get("deep")?;
    println!(
        "✓ get() - resolved {:?}, fast layer now holds it: {}",
        value,
        fast.has("deep")
    );

    // Batch read with misses: every requested key appears exactly once.
    let results = cache.batch_get(&["greeting", "deep", "absent"])?;
    for key in ["greeting", "deep", "absent"] {
        println!("  batch_get[{}] = {:?}", key, results[key]);
    }

    // Strict containment vs. fallback reads.
    cache.remove("deep");
    println!("✓ remove() - contains_key(\"deep\") = {}", cache.contains_key("deep"));

    let stats = cache.stats();
    for (index, layer) in stats.layers.iter().enumerate() {
        println!(
            "  layer {}: {} hits / {} misses ({:.0}% hit ratio), {} sync-backs",
            index,
            layer.hits,
            layer.misses,
            layer.hit_ratio() * 100.0,
            layer.syncback_writes
        );
    }

    cache.clear();
    println!("\n✓ clear() - all layers emptied");
    Ok(())
}
