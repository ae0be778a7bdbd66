//! Core module - platform-independent id allocation

pub mod constants;
pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

pub use error::{MalformedEntry, RegistryError, StoreError};
pub use registry::IdentifierRegistry;
pub use traits::PersistenceBackend;
pub use types::{Binding, IdRange};
