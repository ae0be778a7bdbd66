//! TOML config-file store
//!
//! Layout: one table per namespace, one `name = id` line per binding.
//!
//! ```toml
//! [Items]
//! sword = 33000
//! shield = 33001
//! reserved = [33010, 33011]
//!
//! [Tilesets]
//! marble = 100
//! ```
//!
//! Other tools may add their own keys to the same tables. Scalar values are
//! reported as raw entries, integer arrays as reserved ids, anything else is
//! ignored.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use toml::{Table, Value};
use tracing::{debug, info, warn};

use crate::core::error::StoreError;
use crate::core::traits::PersistenceBackend;

/// Store backed by a TOML file, written through on every write
pub struct TomlFileStore {
    path: PathBuf,
    document: Mutex<Table>,
}

impl TomlFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = Self::read_document(&path)?;
        info!(
            path = %path.display(),
            namespaces = document.len(),
            "[store] Opened id store"
        );
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, picking up edits made by other processes
    pub fn reload(&self) -> Result<(), StoreError> {
        let document = Self::read_document(&self.path)?;
        *self.document.lock() = document;
        debug!(path = %self.path.display(), "[store] Reloaded id store");
        Ok(())
    }

    fn read_document(path: &Path) -> Result<Table, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "[store] No id store found, starting empty");
            return Ok(Table::new());
        }

        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the whole document through a temporary file, then swap it in
    fn write_document(&self, document: &Table) -> Result<(), StoreError> {
        let contents = toml::to_string(document)?;
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let tmp_path = self.path.with_extension("toml.tmp");
        fs::write(&tmp_path, contents).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

/// Render a scalar value the way it appears in the file
fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Integer(i) => Some(i.to_string()),
        Value::String(s) => Some(s.clone()),
        // Debug keeps the fraction ("1000.0"), so a float never parses as an id
        Value::Float(f) => Some(format!("{f:?}")),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

impl PersistenceBackend for TomlFileStore {
    fn read_all_entries(&self, namespace: &str) -> Result<Vec<(String, String)>, StoreError> {
        let document = self.document.lock();
        match document.get(namespace) {
            None => Ok(Vec::new()),
            Some(Value::Table(section)) => Ok(section
                .iter()
                .filter_map(|(key, value)| render_scalar(value).map(|raw| (key.clone(), raw)))
                .collect()),
            Some(_) => {
                warn!(namespace, "[store] Namespace is not a table, ignoring it");
                Ok(Vec::new())
            }
        }
    }

    fn write_entry(&self, namespace: &str, key: &str, value: i32) -> Result<(), StoreError> {
        let mut document = self.document.lock();

        let mut updated = document.clone();
        let section = updated
            .entry(namespace.to_string())
            .or_insert(Value::Table(Table::new()));
        let Value::Table(section) = section else {
            return Err(StoreError::NotATable {
                path: self.path.clone(),
                namespace: namespace.to_string(),
            });
        };
        section.insert(key.to_string(), Value::Integer(i64::from(value)));

        self.write_document(&updated)?;
        *document = updated;
        Ok(())
    }

    fn reserved_ids(&self, namespace: &str) -> Result<Vec<i32>, StoreError> {
        let document = self.document.lock();
        let Some(Value::Table(section)) = document.get(namespace) else {
            return Ok(Vec::new());
        };

        Ok(section
            .values()
            .filter_map(|value| match value {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .flatten()
            .filter_map(|item| item.as_integer())
            .filter_map(|i| i32::try_from(i).ok())
            .collect())
    }
}
