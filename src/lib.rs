// CoreLib identifier registry

pub mod core;
pub mod plugin;
pub mod store;

pub use crate::core::{Binding, IdRange, IdentifierRegistry, PersistenceBackend, RegistryError};
pub use crate::plugin::content::{ContentError, ContentRegistries};
pub use crate::plugin::{start, StartError};
pub use crate::store::{MemoryStore, TomlFileStore};
