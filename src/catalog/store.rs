//! Catalog types for serialization/deserialization
//!
//! These are read from the `[[catalog]]` tables in config.toml at startup.

use serde::{Deserialize, Serialize};

use super::{Category, KeyDef};

/// A single button definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfigEntry {
    /// Key id written into boxes when pressed
    pub id: u32,
    /// Button label text
    pub label: String,
}

/// Replacement button list for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub category: Category,
    #[serde(default)]
    pub keys: Vec<KeyConfigEntry>,
}

impl CategoryConfig {
    /// Convert to runtime key definitions
    pub fn key_defs(&self) -> Vec<KeyDef> {
        self.keys
            .iter()
            .map(|k| KeyDef {
                id: k.id,
                label: k.label.clone(),
            })
            .collect()
    }
}
