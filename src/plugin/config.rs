// Configuration module for CoreLib

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::constants::{
    CONFIG_FILENAME, EQUIPMENT_SLOT_ID_END, EQUIPMENT_SLOT_ID_START, EQUIPMENT_SLOT_NAMESPACE,
    ID_STORE_FILENAME, ITEM_ID_END, ITEM_ID_START, ITEM_NAMESPACE, LOOT_TABLE_ID_END,
    LOOT_TABLE_ID_START, LOOT_TABLE_NAMESPACE, TILESET_ID_END, TILESET_ID_START,
    TILESET_NAMESPACE,
};
use crate::core::types::IdRange;

// =============================================================================
// CONFIGURATION STRUCTURES
// =============================================================================

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingSettings {
    /// Write logs to stdout
    #[serde(default)]
    pub console: bool,
    /// Log file path (relative to the config directory or absolute). Empty = no file logging.
    #[serde(default)]
    pub log_file: String,
}

/// Id store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Id store file (relative to the config directory or absolute)
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    ID_STORE_FILENAME.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// One content domain and the ids reserved for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSettings {
    /// Domain name used by mods (e.g. "items")
    pub name: String,
    /// Table in the id store. Empty = same as `name`.
    #[serde(default)]
    pub namespace: String,
    /// First id of the range
    pub start: i32,
    /// Last id of the range (inclusive)
    pub end: i32,
}

impl DomainSettings {
    pub fn new(name: &str, namespace: &str, start: i32, end: i32) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            start,
            end,
        }
    }

    pub fn namespace(&self) -> &str {
        if self.namespace.is_empty() {
            &self.name
        } else {
            &self.namespace
        }
    }

    pub fn range(&self) -> Result<IdRange, ConfigError> {
        IdRange::new(self.start, self.end).map_err(|e| ConfigError::InvalidDomain {
            name: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

fn default_domains() -> Vec<DomainSettings> {
    vec![
        DomainSettings::new("items", ITEM_NAMESPACE, ITEM_ID_START, ITEM_ID_END),
        DomainSettings::new(
            "tilesets",
            TILESET_NAMESPACE,
            TILESET_ID_START,
            TILESET_ID_END,
        ),
        DomainSettings::new(
            "loot_tables",
            LOOT_TABLE_NAMESPACE,
            LOOT_TABLE_ID_START,
            LOOT_TABLE_ID_END,
        ),
        DomainSettings::new(
            "equipment_slots",
            EQUIPMENT_SLOT_NAMESPACE,
            EQUIPMENT_SLOT_ID_START,
            EQUIPMENT_SLOT_ID_END,
        ),
    ]
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default = "default_domains")]
    pub domains: Vec<DomainSettings>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            logging: LoggingSettings::default(),
            store: StoreSettings::default(),
            domains: default_domains(),
        }
    }
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid domain '{name}': {reason}")]
    InvalidDomain { name: String, reason: String },

    #[error("domain '{0}' is defined more than once")]
    DuplicateDomain(String),

    #[error("namespace '{0}' is used by more than one domain")]
    DuplicateNamespace(String),
}

/// Check domain names, namespaces and ranges
pub fn validate_domains(domains: &[DomainSettings]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    let mut namespaces = HashSet::new();

    for domain in domains {
        if domain.name.is_empty() {
            return Err(ConfigError::InvalidDomain {
                name: domain.name.clone(),
                reason: "name must not be empty".to_string(),
            });
        }
        domain.range()?;

        if !names.insert(domain.name.as_str()) {
            return Err(ConfigError::DuplicateDomain(domain.name.clone()));
        }
        if !namespaces.insert(domain.namespace()) {
            return Err(ConfigError::DuplicateNamespace(
                domain.namespace().to_string(),
            ));
        }
    }
    Ok(())
}

impl PluginConfig {
    /// Parse and validate a configuration document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: PluginConfig = toml::from_str(contents)?;
        validate_domains(&config.domains)?;
        Ok(config)
    }

    /// Load `corelib.toml` from `config_dir`, falling back to defaults
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILENAME);

        debug!(
            path = %config_path.display(),
            "[config] Looking for config"
        );

        if !config_path.exists() {
            debug!("[config] No config found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            path = %config_path.display(),
            domains = config.domains.len(),
            "[config] Loaded config"
        );
        Ok(config)
    }

    /// Id store location
    pub fn store_path(&self, config_dir: &Path) -> PathBuf {
        resolve_path(config_dir, &self.store.path)
    }

    /// Log file location, if file logging is enabled
    pub fn log_file_path(&self, config_dir: &Path) -> Option<PathBuf> {
        if self.logging.log_file.is_empty() {
            None
        } else {
            Some(resolve_path(config_dir, &self.logging.log_file))
        }
    }
}

/// Paths in the config are relative to the config directory unless absolute
fn resolve_path(config_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_dir.join(path)
    }
}
