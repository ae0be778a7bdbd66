//! Error types for id allocation and persistence

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`IdentifierRegistry`](super::registry::IdentifierRegistry)
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Every id of the range is occupied
    #[error("no free id left in range [{start}, {end}] for '{name}'")]
    RangeExhausted { start: i32, end: i32, name: String },

    /// Two names would end up sharing one id
    #[error("'{name}' is persisted with id {id}, which is already bound to '{existing}'")]
    DuplicateBinding {
        name: String,
        id: i32,
        existing: String,
    },

    #[error("invalid id range: start {start} is greater than end {end}")]
    InvalidRange { start: i32, end: i32 },

    #[error("binding name must not be empty")]
    InvalidName,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by persistence backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize id store: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The namespace key exists but holds something other than a table
    #[error("namespace '{namespace}' in {} is not a table", .path.display())]
    NotATable { path: PathBuf, namespace: String },
}

/// A persisted value that does not parse as an id.
///
/// Only ever logged: foreign writers may share a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed entry '{key}' = '{raw}' in namespace '{namespace}'")]
pub struct MalformedEntry {
    pub namespace: String,
    pub key: String,
    pub raw: String,
}

/// Parse a raw persisted value as an id
pub fn parse_entry_value(namespace: &str, key: &str, raw: &str) -> Result<i32, MalformedEntry> {
    raw.trim().parse::<i32>().map_err(|_| MalformedEntry {
        namespace: namespace.to_string(),
        key: key.to_string(),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_exhausted_message() {
        let err = RegistryError::RangeExhausted {
            start: 1000,
            end: 1002,
            name: "axe".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("[1000, 1002]"));
        assert!(msg.contains("axe"));
    }

    #[test]
    fn test_parse_entry_value() {
        assert_eq!(parse_entry_value("Items", "sword", "1000"), Ok(1000));
        assert_eq!(parse_entry_value("Items", "sword", " -3 "), Ok(-3));

        let err = parse_entry_value("Items", "note", "hello").unwrap_err();
        assert_eq!(err.key, "note");
        assert_eq!(err.raw, "hello");
        assert!(err.to_string().contains("Items"));
    }

    #[test]
    fn test_parse_entry_value_out_of_i32() {
        assert!(parse_entry_value("Items", "big", "4294967296").is_err());
        assert!(parse_entry_value("Items", "float", "12.5").is_err());
    }
}
