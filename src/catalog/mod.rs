//! Keypad button catalog: key ids and labels grouped by category

pub mod store;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::state::BoxEntry;
use store::CategoryConfig;

/// Keypad button categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Integer labels
    Number,
    /// Decorated numeric labels
    Special,
    /// Letters
    Character,
}

impl Category {
    /// All categories in keypad order
    pub const ALL: [Category; 3] = [Category::Number, Category::Character, Category::Special];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Number => "Number",
            Category::Special => "Special",
            Category::Character => "Character",
        }
    }

    fn position(&self) -> usize {
        match self {
            Category::Number => 0,
            Category::Character => 1,
            Category::Special => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Catalog construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("key id {id} is defined in both {first} and {second}")]
    DuplicateKey {
        id: u32,
        first: Category,
        second: Category,
    },
}

/// A single keypad button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDef {
    pub id: u32,
    pub label: String,
}

impl KeyDef {
    /// Box entry written when this button is pressed
    pub fn entry(&self) -> BoxEntry {
        BoxEntry::keyed(self.id, self.label.clone())
    }
}

// Key ids are sparse and grouped by category; they must not be renumbered.
const NUMBER_KEYS: [(u32, &str); 15] = [
    (1, "1"),
    (2, "4"),
    (3, "5"),
    (4, "6"),
    (5, "7"),
    (16, "8"),
    (17, "9"),
    (18, "10"),
    (19, "11"),
    (20, "12"),
    (21, "13"),
    (22, "14"),
    (23, "15"),
    (24, "16"),
    (25, "17"),
];

const SPECIAL_KEYS: [(u32, &str); 15] = [
    (6, "16"),
    (7, "4."),
    (8, "5("),
    (9, "6°"),
    (10, "7+"),
    (26, "8."),
    (27, "9."),
    (28, "10."),
    (29, "11."),
    (30, "12."),
    (31, "13."),
    (32, "14."),
    (33, "15."),
    (34, "16."),
    (35, "17."),
];

const CHARACTER_KEYS: [(u32, &str); 15] = [
    (11, "H"),
    (12, "D"),
    (13, "K"),
    (14, "T"),
    (15, "P"),
    (36, "A"),
    (37, "B"),
    (38, "C"),
    (39, "E"),
    (40, "F"),
    (41, "G"),
    (42, "I"),
    (43, "J"),
    (44, "L"),
    (45, "M"),
];

fn reference_keys(category: Category) -> Vec<KeyDef> {
    let table: &[(u32, &str)] = match category {
        Category::Number => &NUMBER_KEYS,
        Category::Special => &SPECIAL_KEYS,
        Category::Character => &CHARACTER_KEYS,
    };

    table
        .iter()
        .map(|&(id, label)| KeyDef {
            id,
            label: label.to_string(),
        })
        .collect()
}

/// Immutable table of keypad buttons, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonCatalog {
    rows: [Vec<KeyDef>; 3],
}

impl Default for ButtonCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

impl ButtonCatalog {
    /// The stock keypad layout
    pub fn reference() -> Self {
        Self {
            rows: Category::ALL.map(reference_keys),
        }
    }

    /// Build from config overrides. Categories not listed keep their stock keys.
    pub fn from_config(overrides: &[CategoryConfig]) -> Result<Self, CatalogError> {
        let mut catalog = Self::reference();

        for entry in overrides {
            catalog.rows[entry.category.position()] = entry.key_defs();
        }

        catalog.check_unique()?;
        Ok(catalog)
    }

    /// Buttons in a category, in keypad order
    pub fn lookup(&self, category: Category) -> &[KeyDef] {
        &self.rows[category.position()]
    }

    /// Find the button with a given key id
    pub fn find(&self, id: u32) -> Option<(Category, &KeyDef)> {
        Category::ALL.into_iter().find_map(|category| {
            self.lookup(category)
                .iter()
                .find(|key| key.id == id)
                .map(|key| (category, key))
        })
    }

    /// Entry a press of `id` would write, if the id exists
    pub fn entry_for(&self, id: u32) -> Option<BoxEntry> {
        self.find(id).map(|(_, key)| key.entry())
    }

    /// Total number of buttons across categories
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_unique(&self) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashMap::new();

        for category in Category::ALL {
            for key in self.lookup(category) {
                if let Some(first) = seen.insert(key.id, category) {
                    return Err(CatalogError::DuplicateKey {
                        id: key.id,
                        first,
                        second: category,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::store::KeyConfigEntry;

    #[test]
    fn test_reference_catalog_pairs() {
        let catalog = ButtonCatalog::reference();

        assert_eq!(catalog.len(), 45);
        assert_eq!(catalog.lookup(Category::Number)[1].label, "4");
        assert_eq!(catalog.lookup(Category::Special)[3].label, "6°");
        assert_eq!(catalog.lookup(Category::Character)[5].id, 36);
    }

    #[test]
    fn test_lookup_keeps_keypad_order() {
        let catalog = ButtonCatalog::reference();
        let ids: Vec<u32> = catalog
            .lookup(Category::Number)
            .iter()
            .map(|k| k.id)
            .collect();

        assert_eq!(
            ids,
            vec![1, 2, 3, 4, 5, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25]
        );
    }

    #[test]
    fn test_find_by_id() {
        let catalog = ButtonCatalog::reference();

        let (category, key) = catalog.find(5).unwrap();
        assert_eq!(category, Category::Number);
        assert_eq!(key.label, "7");

        assert_eq!(catalog.entry_for(44), Some(BoxEntry::keyed(44, "L")));
        assert!(catalog.find(0).is_none());
        assert!(catalog.find(46).is_none());
    }

    #[test]
    fn test_reference_ids_are_unique() {
        assert!(ButtonCatalog::reference().check_unique().is_ok());
    }

    #[test]
    fn test_config_override_replaces_one_category() {
        let overrides = vec![CategoryConfig {
            category: Category::Character,
            keys: vec![KeyConfigEntry {
                id: 100,
                label: "Z".to_string(),
            }],
        }];

        let catalog = ButtonCatalog::from_config(&overrides).unwrap();
        assert_eq!(catalog.lookup(Category::Character).len(), 1);
        assert_eq!(catalog.lookup(Category::Number).len(), 15);
        assert_eq!(catalog.entry_for(100), Some(BoxEntry::keyed(100, "Z")));
    }

    #[test]
    fn test_config_override_rejects_duplicate_ids() {
        let overrides = vec![CategoryConfig {
            category: Category::Special,
            keys: vec![KeyConfigEntry {
                id: 1,
                label: "dup".to_string(),
            }],
        }];

        assert_eq!(
            ButtonCatalog::from_config(&overrides),
            Err(CatalogError::DuplicateKey {
                id: 1,
                first: Category::Number,
                second: Category::Special,
            })
        );
    }

    #[test]
    fn test_rows_match_categories() {
        let catalog = ButtonCatalog::reference();

        for category in Category::ALL {
            for key in catalog.lookup(category) {
                assert_eq!(catalog.find(key.id).unwrap().0, category);
            }
        }
        assert_eq!(catalog.lookup(Category::Special)[0].id, 6);
        assert_eq!(catalog.lookup(Category::Character)[0].id, 11);
    }

    #[test]
    fn test_category_names() {
        let names: Vec<String> = Category::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["Number", "Character", "Special"]);
    }
}
