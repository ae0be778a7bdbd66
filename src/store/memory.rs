//! In-memory store
//!
//! Holds entries for the lifetime of the process only. Useful for hosts
//! without a writable config directory and for tests.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::core::error::StoreError;
use crate::core::traits::PersistenceBackend;

#[derive(Debug, Default)]
struct MemoryState {
    namespaces: BTreeMap<String, BTreeMap<String, String>>,
    writes: usize,
}

/// Namespaced key/value store kept in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a raw entry into the store without going through a registry
    pub fn insert_raw(&self, namespace: &str, key: &str, raw: impl Into<String>) {
        self.state
            .lock()
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), raw.into());
    }

    /// Raw value stored under `key`
    pub fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.state
            .lock()
            .namespaces
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .cloned()
    }

    /// Number of `write_entry` calls served so far
    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }
}

impl PersistenceBackend for MemoryStore {
    fn read_all_entries(&self, namespace: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .state
            .lock()
            .namespaces
            .get(namespace)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(key, raw)| (key.clone(), raw.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn write_entry(&self, namespace: &str, key: &str, value: i32) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        state.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let store = MemoryStore::new();
        store.write_entry("Items", "sword", 1000).unwrap();
        store.write_entry("Items", "shield", 1001).unwrap();
        store.write_entry("Tilesets", "stone", 100).unwrap();

        let entries = store.read_all_entries("Items").unwrap();
        assert_eq!(
            entries,
            vec![
                ("shield".to_string(), "1001".to_string()),
                ("sword".to_string(), "1000".to_string()),
            ]
        );
        assert_eq!(store.write_count(), 3);
    }

    #[test]
    fn test_unknown_namespace_is_empty() {
        let store = MemoryStore::new();
        assert!(store.read_all_entries("Nothing").unwrap().is_empty());
    }

    #[test]
    fn test_raw_entries_are_visible() {
        let store = MemoryStore::new();
        store.insert_raw("Items", "comment", "hello");

        assert_eq!(store.get("Items", "comment"), Some("hello".to_string()));
        assert_eq!(store.write_count(), 0);
        assert_eq!(
            store.read_all_entries("Items").unwrap(),
            vec![("comment".to_string(), "hello".to_string())]
        );
    }

    #[test]
    fn test_write_overwrites() {
        let store = MemoryStore::new();
        store.insert_raw("Items", "gem", "broken");
        store.write_entry("Items", "gem", 7).unwrap();
        assert_eq!(store.get("Items", "gem"), Some("7".to_string()));
    }
}
