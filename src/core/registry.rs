//! Identifier registry - stable ids for named mod content
//!
//! An `IdentifierRegistry` hands out ids from a bounded range to names
//! registered by mods, and persists every binding to a `PersistenceBackend`
//! so the same name gets the same id on the next launch.
//!
//! Bindings are created lazily: entries already in the store from a previous
//! launch stay orphaned until their name is requested again, at which point
//! they are adopted without a new write. Orphans and foreign entries both keep
//! their ids occupied, so a new name never steals an id that a mod not loaded
//! yet in this session will ask for later.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::error::{parse_entry_value, RegistryError};
use super::traits::PersistenceBackend;
use super::types::{Binding, IdRange};

// =============================================================================
// STATE
// =============================================================================

/// Live bindings of the current session
#[derive(Debug, Default)]
struct LiveTable {
    by_name: HashMap<String, i32>,
    by_id: HashMap<i32, String>,
}

impl LiveTable {
    fn insert(&mut self, name: &str, id: i32) {
        self.by_name.insert(name.to_string(), id);
        self.by_id.insert(id, name.to_string());
    }

    fn remove(&mut self, name: &str) -> Option<i32> {
        let id = self.by_name.remove(name)?;
        self.by_id.remove(&id);
        Some(id)
    }
}

/// What the store holds for one namespace at the time of a read
#[derive(Debug, Default)]
struct StoreSnapshot {
    /// Every entry whose value parses as an id, in or out of range
    persisted: HashMap<String, i32>,
    /// Parsed values plus backend-reserved ids
    occupied: BTreeSet<i32>,
}

// =============================================================================
// IDENTIFIER REGISTRY
// =============================================================================

/// Assigns stable ids within an `IdRange` to arbitrary names
///
/// One registry exists per content domain (items, tilesets, ...). All
/// operations take `&self`; the check-scan-write sequence of
/// [`get_or_bind_id`](Self::get_or_bind_id) runs under a single lock.
pub struct IdentifierRegistry {
    namespace: String,
    range: IdRange,
    store: Arc<dyn PersistenceBackend>,
    live: Mutex<LiveTable>,
}

impl IdentifierRegistry {
    /// Create a registry writing into `namespace` of `store`
    pub fn new(
        namespace: impl Into<String>,
        range: IdRange,
        store: Arc<dyn PersistenceBackend>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            range,
            store,
            live: Mutex::new(LiveTable::default()),
        }
    }

    /// Namespace this registry persists into
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Range ids are allocated from
    pub fn range(&self) -> IdRange {
        self.range
    }

    /// Number of live bindings
    pub fn len(&self) -> usize {
        self.live.lock().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the id bound to `name`, binding the lowest free id on first use
    ///
    /// Repeat calls for a live name never touch the store. A name persisted by
    /// a previous session is adopted with its stored id and no write. A new
    /// name costs exactly one write.
    pub fn get_or_bind_id(&self, name: &str) -> Result<i32, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::InvalidName);
        }

        let mut live = self.live.lock();
        if let Some(&id) = live.by_name.get(name) {
            return Ok(id);
        }

        let snapshot = self.read_snapshot()?;

        if let Some(&id) = snapshot.persisted.get(name) {
            if self.range.contains(id) {
                if let Some(existing) = live.by_id.get(&id) {
                    return Err(RegistryError::DuplicateBinding {
                        name: name.to_string(),
                        id,
                        existing: existing.clone(),
                    });
                }
                live.insert(name, id);
                debug!(
                    namespace = %self.namespace,
                    name,
                    id,
                    "[registry] Restored persisted binding"
                );
                return Ok(id);
            }
            warn!(
                namespace = %self.namespace,
                name,
                id,
                range = %self.range,
                "[registry] Persisted id is outside the range, rebinding"
            );
        }

        let Some(id) = self.lowest_free_id(&live, &snapshot) else {
            error!(
                namespace = %self.namespace,
                name,
                range = %self.range,
                "[registry] Id range exhausted"
            );
            return Err(RegistryError::RangeExhausted {
                start: self.range.start(),
                end: self.range.end(),
                name: name.to_string(),
            });
        };

        self.store.write_entry(&self.namespace, name, id)?;
        live.insert(name, id);
        info!(
            namespace = %self.namespace,
            name,
            id,
            "[registry] Bound new id"
        );
        Ok(id)
    }

    /// Check whether `id` could be handed to a new name
    ///
    /// An id is taken when it is out of range, live, stored as a value anywhere
    /// in the namespace, or reserved by the backend. If the store cannot be
    /// read the id is reported as taken.
    pub fn is_id_free(&self, id: i32) -> bool {
        if !self.range.contains(id) {
            return false;
        }

        let live = self.live.lock();
        if live.by_id.contains_key(&id) {
            return false;
        }

        match self.read_snapshot() {
            Ok(snapshot) => !snapshot.occupied.contains(&id),
            Err(e) => {
                warn!(
                    namespace = %self.namespace,
                    error = %e,
                    "[registry] Could not read store, treating id as taken"
                );
                false
            }
        }
    }

    /// Drop the live binding for `name`
    ///
    /// The persisted entry is kept, so the id stays occupied and the same name
    /// gets it back on its next request. Returns whether a live binding was
    /// removed.
    pub fn try_release_binding(&self, name: &str) -> bool {
        match self.live.lock().remove(name) {
            Some(id) => {
                debug!(
                    namespace = %self.namespace,
                    name,
                    id,
                    "[registry] Released live binding"
                );
                true
            }
            None => false,
        }
    }

    /// Live id of `name`, without binding
    pub fn id_of(&self, name: &str) -> Option<i32> {
        self.live.lock().by_name.get(name).copied()
    }

    /// Live name bound to `id`
    pub fn name_of(&self, id: i32) -> Option<String> {
        self.live.lock().by_id.get(&id).cloned()
    }

    /// Live bindings, sorted by id
    pub fn bindings(&self) -> Vec<Binding> {
        let live = self.live.lock();
        let mut bindings: Vec<Binding> = live
            .by_name
            .iter()
            .map(|(name, &id)| Binding::new(name.clone(), id))
            .collect();
        bindings.sort_by_key(|b| b.id);
        bindings
    }

    /// Persisted in-range entries that are not live in this session, sorted by id
    pub fn orphans(&self) -> Result<Vec<Binding>, RegistryError> {
        let live = self.live.lock();
        let snapshot = self.read_snapshot()?;
        let mut orphans: Vec<Binding> = snapshot
            .persisted
            .into_iter()
            .filter(|(name, id)| self.range.contains(*id) && !live.by_name.contains_key(name))
            .map(|(name, id)| Binding::new(name, id))
            .collect();
        orphans.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)));
        Ok(orphans)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn read_snapshot(&self) -> Result<StoreSnapshot, RegistryError> {
        let mut snapshot = StoreSnapshot::default();

        for (key, raw) in self.store.read_all_entries(&self.namespace)? {
            match parse_entry_value(&self.namespace, &key, &raw) {
                Ok(id) => {
                    snapshot.occupied.insert(id);
                    snapshot.persisted.insert(key, id);
                }
                Err(e) => {
                    warn!(error = %e, "[registry] Skipping malformed entry");
                }
            }
        }

        snapshot
            .occupied
            .extend(self.store.reserved_ids(&self.namespace)?);
        Ok(snapshot)
    }

    /// Lowest id of the range that is neither live nor occupied in the store
    fn lowest_free_id(&self, live: &LiveTable, snapshot: &StoreSnapshot) -> Option<i32> {
        let mut taken: BTreeSet<i32> = snapshot
            .occupied
            .range(self.range.start()..=self.range.end())
            .copied()
            .collect();
        taken.extend(live.by_id.keys().copied());

        // Widened so the walk can step past i32::MAX
        let mut candidate = i64::from(self.range.start());
        for id in taken {
            let id = i64::from(id);
            if id > candidate {
                break;
            }
            if id == candidate {
                candidate += 1;
            }
        }

        if candidate <= i64::from(self.range.end()) {
            Some(candidate as i32)
        } else {
            None
        }
    }
}
