//! Startup restore, reset and totals for the whole grid

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::state::{BoxEntry, BoxStore};

/// Sum of the key ids in an aggregate map; keyless entries count as 0
pub fn sum_keys(entries: &BTreeMap<usize, BoxEntry>) -> u64 {
    entries
        .values()
        .fold(0, |acc, entry| acc + u64::from(entry.key.unwrap_or(0)))
}

pub struct HomeController {
    store: Arc<BoxStore>,
}

impl HomeController {
    pub fn new(store: Arc<BoxStore>) -> Self {
        Self { store }
    }

    /// Number of boxes in the grid
    pub fn boxes(&self) -> usize {
        self.store.slot_count()
    }

    /// Replay the persisted record into the store
    pub fn on_ready(&self) -> usize {
        self.on_ready_with(|_, _| {})
    }

    /// Replay the persisted record, calling `refresh` after each box is restored
    pub fn on_ready_with<F>(&self, mut refresh: F) -> usize
    where
        F: FnMut(usize, &BoxEntry),
    {
        let entries = self.store.load_record();
        let count = entries.len();

        for (slot, entry) in entries {
            self.store.update_box_value(slot, entry.clone());
            refresh(slot, &entry);
        }

        info!("Restored {} boxes", count);
        count
    }

    /// Blank every box, drop the selection and erase the persisted record
    pub fn reset_all(&self) {
        self.store.broadcast_all(&BoxEntry::cleared());
        self.store.clear_selected_index();
        self.store.clear_aggregate();
        self.store.erase_record();
        info!("All boxes reset");
    }

    pub fn total_sum(&self) -> u64 {
        sum_keys(&self.store.aggregate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MemoryStorage, RecordStorage, DEFAULT_RECORD_KEY};
    use crate::state::StoreSettings;
    use crate::view::BoxView;

    fn home_with(storage: &MemoryStorage) -> (Arc<BoxStore>, HomeController) {
        let store = Arc::new(BoxStore::new(
            StoreSettings::default(),
            Arc::new(storage.clone()),
        ));
        (store.clone(), HomeController::new(store))
    }

    #[test]
    fn test_sum_keys() {
        let mut entries = BTreeMap::new();
        entries.insert(0, BoxEntry::keyed(3, "x"));
        entries.insert(2, BoxEntry::keyed(5, "y"));
        assert_eq!(sum_keys(&entries), 8);

        entries.insert(4, BoxEntry::cleared());
        assert_eq!(sum_keys(&entries), 8);
        assert_eq!(sum_keys(&BTreeMap::new()), 0);
    }

    #[test]
    fn test_total_sum() {
        let (store, home) = home_with(&MemoryStorage::new());
        store.update_box_value(0, BoxEntry::keyed(3, "x"));
        store.update_box_value(2, BoxEntry::keyed(5, "y"));

        assert_eq!(home.total_sum(), 8);
    }

    #[test]
    fn test_on_ready_restores_record() {
        let storage = MemoryStorage::new();
        storage
            .write(DEFAULT_RECORD_KEY, r#"[[1,[2,"4"]],[7,[36,"A"]]]"#)
            .unwrap();
        let (store, home) = home_with(&storage);
        let mut view = BoxView::attach(store.clone(), 7);

        let mut refreshed = Vec::new();
        let count = home.on_ready_with(|slot, _| refreshed.push(slot));

        assert_eq!(count, 2);
        assert_eq!(refreshed, vec![1, 7]);
        assert_eq!(store.aggregate_entry(1), Some(BoxEntry::keyed(2, "4")));
        view.sync();
        assert_eq!(view.current_value(), "A");
        assert_eq!(home.total_sum(), 38);
    }

    #[test]
    fn test_on_ready_with_corrupt_record_starts_empty() {
        let storage = MemoryStorage::new();
        storage.write(DEFAULT_RECORD_KEY, "[[1,").unwrap();
        let (store, home) = home_with(&storage);

        assert_eq!(home.on_ready(), 0);
        assert!(store.aggregate().is_empty());
    }

    #[test]
    fn test_reset_all() {
        let storage = MemoryStorage::new();
        let (store, home) = home_with(&storage);
        let mut views: Vec<BoxView> = (0..3).map(|i| BoxView::attach(store.clone(), i)).collect();

        store.select_box(0);
        for i in 0..3 {
            store.update_box_value(i, BoxEntry::keyed(i as u32 + 1, (i + 1).to_string()));
        }
        for view in &mut views {
            view.sync();
        }
        assert_eq!(views[2].current_value(), "3");

        home.reset_all();

        assert!(store.aggregate().is_empty());
        assert_eq!(store.selected_index(), None);
        assert_eq!(storage.read(DEFAULT_RECORD_KEY).unwrap(), None);
        for view in &mut views {
            view.sync();
            assert_eq!(view.current_value(), "");
            assert_eq!(view.current_key(), None);
            assert!(!view.is_selected());
        }
        assert_eq!(home.total_sum(), 0);
    }

    #[test]
    fn test_boxes_reports_slot_count() {
        let (_, home) = home_with(&MemoryStorage::new());
        assert_eq!(home.boxes(), 10);
    }
}
