use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::{ButtonCatalog, Category, KeyDef};
use crate::state::{BoxEntry, BoxStore};

/// Highlighted key when the bound box holds nothing
pub const NO_HIGHLIGHT: u32 = 0;

/// Routes keypad presses into the selected box and advances the selection
pub struct KeyPadController {
    store: Arc<BoxStore>,
    catalog: Arc<ButtonCatalog>,
    bound_index: usize,
    highlighted_key: u32,
}

impl KeyPadController {
    pub fn new(store: Arc<BoxStore>, catalog: Arc<ButtonCatalog>) -> Self {
        let mut keypad = Self {
            store,
            catalog,
            bound_index: 0,
            highlighted_key: NO_HIGHLIGHT,
        };
        keypad.refresh_highlight();
        keypad
    }

    /// Buttons of one category, in keypad order
    pub fn keys(&self, category: Category) -> &[KeyDef] {
        self.catalog.lookup(category)
    }

    /// All categories with their buttons
    pub fn categories(&self) -> impl Iterator<Item = (Category, &[KeyDef])> {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.keys(category)))
    }

    /// Write `entry` into the selected box, then move the selection one box on.
    ///
    /// The selection is read once; nothing happens when no box is selected.
    /// Returns the box that was written.
    pub fn on_button_activated(&self, entry: BoxEntry) -> Option<usize> {
        let Some(index) = self.store.selected_index() else {
            debug!("Key {:?} pressed with no box selected", entry.key);
            return None;
        };

        info!("Box {} <- {:?} '{}'", index, entry.key, entry.label);
        self.store.update_box_value(index, entry);
        // The store drops selections past the last box
        self.store.select_box(index + 1);
        Some(index)
    }

    /// Press a catalog button by key id
    pub fn press(&self, key_id: u32) -> Option<usize> {
        match self.catalog.entry_for(key_id) {
            Some(entry) => self.on_button_activated(entry),
            None => {
                warn!("Unknown key id {}", key_id);
                None
            }
        }
    }

    /// Box whose stored key is highlighted on the keypad
    pub fn bound_index(&self) -> usize {
        self.bound_index
    }

    /// Rebind to another box and recompute the highlighted key
    pub fn set_bound_index(&mut self, index: usize) {
        self.bound_index = index;
        self.refresh_highlight();
    }

    /// Key stored in the bound box, or [`NO_HIGHLIGHT`]
    pub fn current_highlighted_key(&self) -> u32 {
        self.highlighted_key
    }

    fn refresh_highlight(&mut self) {
        self.highlighted_key = self
            .store
            .aggregate_entry(self.bound_index)
            .and_then(|entry| entry.key)
            .unwrap_or(NO_HIGHLIGHT);
        debug!(
            "Keypad bound to box {} (highlight {})",
            self.bound_index, self.highlighted_key
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStorage;
    use crate::state::StoreSettings;

    fn keypad() -> (Arc<BoxStore>, KeyPadController) {
        let store = Arc::new(BoxStore::new(
            StoreSettings::default(),
            Arc::new(MemoryStorage::new()),
        ));
        let keypad = KeyPadController::new(store.clone(), Arc::new(ButtonCatalog::reference()));
        (store, keypad)
    }

    #[test]
    fn test_activation_fills_and_advances() {
        let (store, keypad) = keypad();
        store.select_box(3);

        assert_eq!(keypad.on_button_activated(BoxEntry::keyed(5, "7")), Some(3));
        assert_eq!(store.aggregate_entry(3), Some(BoxEntry::keyed(5, "7")));
        assert_eq!(store.selected_index(), Some(4));
    }

    #[test]
    fn test_activation_on_last_box_keeps_selection() {
        let (store, keypad) = keypad();
        store.select_box(9);

        keypad.on_button_activated(BoxEntry::keyed(5, "7"));
        assert_eq!(store.aggregate_entry(9), Some(BoxEntry::keyed(5, "7")));
        assert_eq!(store.selected_index(), Some(9));

        keypad.on_button_activated(BoxEntry::keyed(11, "H"));
        assert_eq!(store.aggregate_entry(9), Some(BoxEntry::keyed(11, "H")));
        assert_eq!(store.selected_index(), Some(9));
    }

    #[test]
    fn test_activation_without_selection_is_noop() {
        let (store, keypad) = keypad();

        assert_eq!(keypad.on_button_activated(BoxEntry::keyed(5, "7")), None);
        assert!(store.aggregate().is_empty());
        assert_eq!(store.selected_index(), None);
    }

    #[test]
    fn test_press_resolves_catalog_label() {
        let (store, keypad) = keypad();
        store.select_box(0);

        keypad.press(8);
        assert_eq!(store.aggregate_entry(0), Some(BoxEntry::keyed(8, "5(")));

        assert_eq!(keypad.press(999), None);
        assert_eq!(store.selected_index(), Some(1));
    }

    #[test]
    fn test_highlight_follows_bound_index() {
        let (store, mut keypad) = keypad();
        assert_eq!(keypad.current_highlighted_key(), NO_HIGHLIGHT);

        store.update_box_value(2, BoxEntry::keyed(13, "K"));
        keypad.set_bound_index(2);
        assert_eq!(keypad.current_highlighted_key(), 13);

        keypad.set_bound_index(3);
        assert_eq!(keypad.current_highlighted_key(), NO_HIGHLIGHT);
    }

    #[test]
    fn test_categories_cover_catalog() {
        let (_, keypad) = keypad();
        let total: usize = keypad.categories().map(|(_, keys)| keys.len()).sum();

        assert_eq!(total, 45);
        assert_eq!(keypad.keys(Category::Character)[0].label, "H");
    }
}
