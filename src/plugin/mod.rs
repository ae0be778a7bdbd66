//! Plugin module - host-facing side of CoreLib
//!
//! This module contains the code a host loads CoreLib through:
//! - Configuration loading
//! - Logging setup
//! - Per-domain content registries
//! - Startup sequence

pub mod config;
pub mod content;
pub mod logging;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::core::error::{RegistryError, StoreError};
use crate::store::TomlFileStore;

use self::config::{ConfigError, PluginConfig};
use self::content::ContentRegistries;

#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Load config from `config_dir`, set up logging, open the id store and build
/// the content registries
pub fn start(config_dir: &Path) -> Result<ContentRegistries, StartError> {
    let config = PluginConfig::load(config_dir)?;
    logging::init_logging(config.logging.console, config.log_file_path(config_dir));
    info!("CoreLib starting...");

    let store = TomlFileStore::open(config.store_path(config_dir))?;
    let registries = ContentRegistries::new(&config.domains, Arc::new(store))?;
    info!("{}", registries.summary());

    let orphans = registries.log_orphans()?;
    info!(orphans, "CoreLib started");
    Ok(registries)
}
