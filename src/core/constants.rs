//! Content domain constants - default id ranges and namespaces
//!
//! Each range sits above the ids the base game ships with, so mod content
//! never shadows vanilla objects.

// =============================================================================
// ITEMS
// =============================================================================

/// First object id available to mod items
pub const ITEM_ID_START: i32 = 33000;

/// Last object id available to mod items (object ids are stored as u16 by the game)
pub const ITEM_ID_END: i32 = u16::MAX as i32;

pub const ITEM_NAMESPACE: &str = "Items";

// =============================================================================
// TILESETS
// =============================================================================

pub const TILESET_ID_START: i32 = 100;
pub const TILESET_ID_END: i32 = 200;
pub const TILESET_NAMESPACE: &str = "Tilesets";

// =============================================================================
// LOOT TABLES
// =============================================================================

pub const LOOT_TABLE_ID_START: i32 = 1000;
pub const LOOT_TABLE_ID_END: i32 = 1999;
pub const LOOT_TABLE_NAMESPACE: &str = "LootTables";

// =============================================================================
// EQUIPMENT SLOTS
// =============================================================================

/// Slot types are a byte-sized enum in the game; vanilla uses the low values
pub const EQUIPMENT_SLOT_ID_START: i32 = 30;
pub const EQUIPMENT_SLOT_ID_END: i32 = 127;
pub const EQUIPMENT_SLOT_NAMESPACE: &str = "EquipmentSlots";

// =============================================================================
// FILES
// =============================================================================

/// Plugin configuration file name
pub const CONFIG_FILENAME: &str = "corelib.toml";

/// Default id store file name, relative to the config directory
pub const ID_STORE_FILENAME: &str = "corelib_ids.toml";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IdRange;

    #[test]
    fn test_default_ranges_are_valid() {
        for (start, end) in [
            (ITEM_ID_START, ITEM_ID_END),
            (TILESET_ID_START, TILESET_ID_END),
            (LOOT_TABLE_ID_START, LOOT_TABLE_ID_END),
            (EQUIPMENT_SLOT_ID_START, EQUIPMENT_SLOT_ID_END),
        ] {
            assert!(IdRange::new(start, end).is_ok(), "[{start}, {end}]");
        }
    }

    #[test]
    fn test_item_range_fits_u16() {
        assert_eq!(ITEM_ID_END, 65535);
        assert_eq!(IdRange::new(ITEM_ID_START, ITEM_ID_END).unwrap().len(), 32536);
    }
}
