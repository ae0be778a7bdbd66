//! Core types - id ranges and bindings
//!
//! These types are shared by the registry and the persistence backends.

use std::fmt;

use super::error::RegistryError;

// =============================================================================
// ID RANGE
// =============================================================================

/// Inclusive range of identifiers reserved for one content domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdRange {
    start: i32,
    end: i32,
}

impl IdRange {
    /// Create a new range. Fails when `start > end`.
    pub fn new(start: i32, end: i32) -> Result<Self, RegistryError> {
        if start > end {
            return Err(RegistryError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First id of the range
    pub fn start(&self) -> i32 {
        self.start
    }

    /// Last id of the range (inclusive)
    pub fn end(&self) -> i32 {
        self.end
    }

    /// Check if `id` lies within the range
    pub fn contains(&self, id: i32) -> bool {
        self.start <= id && id <= self.end
    }

    /// Number of ids in the range
    pub fn len(&self) -> u64 {
        (i64::from(self.end) - i64::from(self.start) + 1) as u64
    }

    /// A range always holds at least one id
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if two ranges share at least one id
    pub fn overlaps(&self, other: &IdRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

// =============================================================================
// BINDING
// =============================================================================

/// A persisted name -> id association
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    pub name: String,
    pub id: i32,
}

impl Binding {
    pub fn new(name: impl Into<String>, id: i32) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_rejects_inverted_bounds() {
        let err = IdRange::new(10, 5).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidRange { start: 10, end: 5 }
        ));
    }

    #[test]
    fn test_range_single_id() {
        let range = IdRange::new(7, 7).unwrap();
        assert_eq!(range.len(), 1);
        assert!(range.contains(7));
        assert!(!range.contains(6));
        assert!(!range.contains(8));
    }

    #[test]
    fn test_range_len_full_i32() {
        let range = IdRange::new(i32::MIN, i32::MAX).unwrap();
        assert_eq!(range.len(), 1u64 << 32);
    }

    #[test]
    fn test_range_overlaps() {
        let a = IdRange::new(100, 200).unwrap();
        let b = IdRange::new(200, 300).unwrap();
        let c = IdRange::new(201, 300).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_range_display() {
        let range = IdRange::new(1000, 1002).unwrap();
        assert_eq!(range.to_string(), "[1000, 1002]");
    }
}
