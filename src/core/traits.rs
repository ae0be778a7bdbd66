//! Core traits - abstractions over the persistence backend
//!
//! The registry only sees a namespaced key/value store. Concrete stores live in
//! the `store` module. For testing, mock implementations are provided.

use super::error::StoreError;

// =============================================================================
// PERSISTENCE BACKEND
// =============================================================================

/// Namespaced key/value store holding persisted bindings
///
/// Keys are binding names, values are ids. Other writers may put arbitrary
/// entries into the same namespace, so reads return raw strings.
pub trait PersistenceBackend: Send + Sync {
    /// Enumerate every scalar entry visible in `namespace`
    ///
    /// Includes entries not written by a registry. Values are returned as
    /// written, without any attempt to parse them.
    fn read_all_entries(&self, namespace: &str) -> Result<Vec<(String, String)>, StoreError>;

    /// Durably persist one `key = value` entry in `namespace`
    fn write_entry(&self, namespace: &str, key: &str, value: i32) -> Result<(), StoreError>;

    /// Ids held by the store outside of plain entries
    ///
    /// Backends with extra occupancy sources override this. Every returned id
    /// is treated as taken when allocating.
    fn reserved_ids(&self, _namespace: &str) -> Result<Vec<i32>, StoreError> {
        Ok(Vec::new())
    }
}

// =============================================================================
// TEST MOCKS
// =============================================================================

#[cfg(test)]
pub mod mocks {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::BTreeMap;

    /// Mock store recording every write
    ///
    /// Reads and writes can be made to fail to exercise error paths.
    #[derive(Default)]
    pub struct MockStore {
        pub entries: Mutex<BTreeMap<(String, String), String>>,
        pub writes: Mutex<Vec<(String, String, i32)>>,
        pub reads: Mutex<usize>,
        pub reserved: Mutex<Vec<i32>>,
        pub fail_reads: Mutex<bool>,
        pub fail_writes: Mutex<bool>,
    }

    impl MockStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Put a raw entry into the store, as a foreign writer would
        pub fn insert_raw(&self, namespace: &str, key: &str, raw: &str) {
            self.entries
                .lock()
                .insert((namespace.to_string(), key.to_string()), raw.to_string());
        }

        pub fn set_reserved(&self, ids: Vec<i32>) {
            *self.reserved.lock() = ids;
        }

        pub fn set_fail_reads(&self, fail: bool) {
            *self.fail_reads.lock() = fail;
        }

        pub fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock() = fail;
        }

        pub fn write_count(&self) -> usize {
            self.writes.lock().len()
        }

        pub fn read_count(&self) -> usize {
            *self.reads.lock()
        }

        pub fn get(&self, namespace: &str, key: &str) -> Option<String> {
            self.entries
                .lock()
                .get(&(namespace.to_string(), key.to_string()))
                .cloned()
        }

        fn io_error() -> StoreError {
            StoreError::Io {
                path: "mock".into(),
                source: std::io::Error::other("mock failure"),
            }
        }
    }

    impl PersistenceBackend for MockStore {
        fn read_all_entries(&self, namespace: &str) -> Result<Vec<(String, String)>, StoreError> {
            *self.reads.lock() += 1;
            if *self.fail_reads.lock() {
                return Err(Self::io_error());
            }
            Ok(self
                .entries
                .lock()
                .iter()
                .filter(|((ns, _), _)| ns == namespace)
                .map(|((_, key), raw)| (key.clone(), raw.clone()))
                .collect())
        }

        fn write_entry(&self, namespace: &str, key: &str, value: i32) -> Result<(), StoreError> {
            if *self.fail_writes.lock() {
                return Err(Self::io_error());
            }
            self.writes
                .lock()
                .push((namespace.to_string(), key.to_string(), value));
            self.insert_raw(namespace, key, &value.to_string());
            Ok(())
        }

        fn reserved_ids(&self, _namespace: &str) -> Result<Vec<i32>, StoreError> {
            Ok(self.reserved.lock().clone())
        }
    }
}
