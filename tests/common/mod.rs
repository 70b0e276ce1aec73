//! Shared fixtures for integration tests

use std::collections::HashMap;
use std::time::Duration;

use layercache::traits::Store;

/// Store whose every operation fails: reads are absent, writes and deletes
/// are rejected. Stands in for a broken or unreachable backend.
#[derive(Debug, Default)]
pub struct FailingStore;

impl<T: Send + Sync> Store<T> for FailingStore {
    fn get(&self, _key: &str) -> Option<T> {
        None
    }

    fn get_multiple(&self, _keys: &[String]) -> HashMap<String, T> {
        HashMap::new()
    }

    fn set(&self, _key: &str, _value: T, _ttl: Option<Duration>) -> bool {
        false
    }

    fn set_multiple(&self, _items: HashMap<String, T>, _ttl: Option<Duration>) -> bool {
        false
    }

    fn has(&self, _key: &str) -> bool {
        false
    }

    fn delete(&self, _key: &str) -> bool {
        false
    }

    fn delete_multiple(&self, _keys: &[String]) -> bool {
        false
    }

    fn clear(&self) -> bool {
        false
    }
}
