//! Content registries - one identifier registry per content domain
//!
//! Mods register their items, tilesets, loot tables and equipment slots by
//! name through `ContentRegistries`. Each domain has its own id range and its
//! own namespace in the shared store.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::config::{validate_domains, ConfigError, DomainSettings};
use crate::core::error::RegistryError;
use crate::core::registry::IdentifierRegistry;
use crate::core::traits::PersistenceBackend;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("unknown content domain '{0}'")]
    UnknownDomain(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Identifier registries for every configured content domain
pub struct ContentRegistries {
    store: Arc<dyn PersistenceBackend>,
    domains: BTreeMap<String, IdentifierRegistry>,
}

impl ContentRegistries {
    /// Build one registry per domain, all persisting into `store`
    pub fn new(
        domains: &[DomainSettings],
        store: Arc<dyn PersistenceBackend>,
    ) -> Result<Self, ConfigError> {
        validate_domains(domains)?;

        let mut registries = BTreeMap::new();
        for domain in domains {
            let registry =
                IdentifierRegistry::new(domain.namespace(), domain.range()?, store.clone());
            registries.insert(domain.name.clone(), registry);
        }

        Ok(Self {
            store,
            domains: registries,
        })
    }

    /// Registry of one domain
    pub fn domain(&self, domain: &str) -> Option<&IdentifierRegistry> {
        self.domains.get(domain)
    }

    fn require(&self, domain: &str) -> Result<&IdentifierRegistry, ContentError> {
        self.domain(domain)
            .ok_or_else(|| ContentError::UnknownDomain(domain.to_string()))
    }

    /// Stable id of `name` within `domain`, bound on first use
    pub fn get_or_bind_id(&self, domain: &str, name: &str) -> Result<i32, ContentError> {
        Ok(self.require(domain)?.get_or_bind_id(name)?)
    }

    /// Drop the live binding of `name` within `domain` (the stored id is kept)
    pub fn try_release_binding(&self, domain: &str, name: &str) -> Result<bool, ContentError> {
        Ok(self.require(domain)?.try_release_binding(name))
    }

    /// Names of all configured domains, sorted
    pub fn domain_names(&self) -> Vec<&str> {
        self.domains.keys().map(|s| s.as_str()).collect()
    }

    /// Store shared by all domains
    pub fn store(&self) -> &Arc<dyn PersistenceBackend> {
        &self.store
    }

    /// Log how many persisted entries each domain has not claimed yet
    pub fn log_orphans(&self) -> Result<usize, RegistryError> {
        let mut total = 0;
        for (name, registry) in &self.domains {
            let orphans = registry.orphans()?;
            if !orphans.is_empty() {
                info!(
                    domain = %name,
                    count = orphans.len(),
                    "[content] Persisted ids waiting for their mods"
                );
            }
            total += orphans.len();
        }
        Ok(total)
    }

    /// Summary of configured domains for logging
    pub fn summary(&self) -> String {
        let mut out = String::from("Content registries:");
        for (name, registry) in &self.domains {
            let _ = write!(
                out,
                "\n - {} ({}): {} ids, {} bound",
                name,
                registry.range(),
                registry.range().len(),
                registry.len()
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn make_registries(store: &Arc<MemoryStore>) -> ContentRegistries {
        ContentRegistries::new(
            &[
                DomainSettings::new("items", "Items", 33000, 33002),
                DomainSettings::new("tilesets", "Tilesets", 100, 200),
            ],
            store.clone(),
        )
        .unwrap()
    }

    #[test]
    fn test_domains_are_isolated() {
        let store = Arc::new(MemoryStore::new());
        let registries = make_registries(&store);

        assert_eq!(registries.get_or_bind_id("items", "stone").unwrap(), 33000);
        assert_eq!(registries.get_or_bind_id("tilesets", "stone").unwrap(), 100);
        assert_eq!(store.get("Items", "stone"), Some("33000".to_string()));
        assert_eq!(store.get("Tilesets", "stone"), Some("100".to_string()));
    }

    #[test]
    fn test_unknown_domain() {
        let store = Arc::new(MemoryStore::new());
        let registries = make_registries(&store);

        assert!(matches!(
            registries.get_or_bind_id("recipes", "bread"),
            Err(ContentError::UnknownDomain(ref d)) if d == "recipes"
        ));
        assert!(registries.try_release_binding("recipes", "bread").is_err());
        assert!(registries.domain("recipes").is_none());
    }

    #[test]
    fn test_registry_errors_pass_through() {
        let store = Arc::new(MemoryStore::new());
        let registries = make_registries(&store);

        for name in ["a", "b", "c"] {
            registries.get_or_bind_id("items", name).unwrap();
        }
        assert!(matches!(
            registries.get_or_bind_id("items", "d"),
            Err(ContentError::Registry(RegistryError::RangeExhausted { .. }))
        ));
    }

    #[test]
    fn test_release_and_rebind() {
        let store = Arc::new(MemoryStore::new());
        let registries = make_registries(&store);

        let id = registries.get_or_bind_id("items", "lantern").unwrap();
        assert!(registries.try_release_binding("items", "lantern").unwrap());
        assert_eq!(registries.get_or_bind_id("items", "lantern").unwrap(), id);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_invalid_domains_rejected() {
        let store: Arc<dyn PersistenceBackend> = Arc::new(MemoryStore::new());
        let result = ContentRegistries::new(&[DomainSettings::new("items", "", 5, 1)], store);
        assert!(matches!(result, Err(ConfigError::InvalidDomain { .. })));
    }

    #[test]
    fn test_orphans_counted() {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw("Items", "uninstalled_mod_item", "33001");
        store.insert_raw("Tilesets", "old_tiles", "150");
        store.insert_raw("Tilesets", "out_of_range", "5");
        let registries = make_registries(&store);

        assert_eq!(registries.log_orphans().unwrap(), 2);
        assert_eq!(registries.get_or_bind_id("items", "new_item").unwrap(), 33000);
        assert_eq!(registries.get_or_bind_id("items", "newer_item").unwrap(), 33002);
    }

    #[test]
    fn test_summary_and_names() {
        let store = Arc::new(MemoryStore::new());
        let registries = make_registries(&store);
        registries.get_or_bind_id("items", "sword").unwrap();

        assert_eq!(registries.domain_names(), vec!["items", "tilesets"]);
        let summary = registries.summary();
        assert!(summary.contains("items ([33000, 33002]): 3 ids, 1 bound"));
        assert!(summary.contains("tilesets ([100, 200]): 101 ids, 0 bound"));
        assert_eq!(registries.store().read_all_entries("Items").unwrap().len(), 1);
    }
}
