use serde::{Deserialize, Serialize};

/// Value held by a single box: the pressed key id and its rendered label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxEntry {
    /// Catalog key id. `None` marks a cleared box that is never aggregated.
    pub key: Option<u32>,
    /// Display label from the catalog (empty when cleared)
    pub label: String,
}

impl BoxEntry {
    /// Entry produced by a keypad press
    pub fn keyed(key: u32, label: impl Into<String>) -> Self {
        Self {
            key: Some(key),
            label: label.into(),
        }
    }

    /// Empty marker used to blank a box without touching the aggregate map
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Whether this entry carries a numeric key (and so is aggregated and persisted)
    pub fn is_keyed(&self) -> bool {
        self.key.is_some()
    }
}

/// Events delivered to box subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoxEvent {
    /// A box received a new value
    ValueUpdate { slot: usize, entry: BoxEntry },
    /// The global selection moved (or was cleared)
    SelectionChanged(Option<usize>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleared_entry_is_not_keyed() {
        let entry = BoxEntry::cleared();
        assert!(!entry.is_keyed());
        assert!(entry.label.is_empty());
    }

    #[test]
    fn test_keyed_entry() {
        let entry = BoxEntry::keyed(5, "7");
        assert!(entry.is_keyed());
        assert_eq!(entry.key, Some(5));
        assert_eq!(entry.label, "7");
    }
}
