use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::event::{BoxEntry, BoxEvent};
use crate::persist::{decode_record, encode_record, RecordStorage, DEFAULT_RECORD_KEY};

/// Default number of boxes in the grid
pub const DEFAULT_SLOT_COUNT: usize = 10;

/// Default buffer size of each broadcast channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Sizing and naming for a [`BoxStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Number of boxes; selections at or past this index are ignored
    pub slot_count: usize,
    /// Events buffered per receiver before it lags
    pub channel_capacity: usize,
    /// Storage key of the persisted record
    pub record_key: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            record_key: DEFAULT_RECORD_KEY.to_string(),
        }
    }
}

struct StoreInner {
    selected: Option<usize>,
    channels: BTreeMap<usize, broadcast::Sender<BoxEvent>>,
    aggregate: BTreeMap<usize, BoxEntry>,
}

/// Single source of truth for the grid: selection, per-box channels,
/// the aggregate map and its persisted record.
///
/// Constructed once at startup and shared as `Arc<BoxStore>`.
pub struct BoxStore {
    settings: StoreSettings,
    inner: RwLock<StoreInner>,
    selection_tx: broadcast::Sender<BoxEvent>,
    storage: Arc<dyn RecordStorage>,
}

impl BoxStore {
    pub fn new(settings: StoreSettings, storage: Arc<dyn RecordStorage>) -> Self {
        let capacity = settings.channel_capacity.max(1);
        let (selection_tx, _) = broadcast::channel(capacity);

        Self {
            settings,
            inner: RwLock::new(StoreInner {
                selected: None,
                channels: BTreeMap::new(),
                aggregate: BTreeMap::new(),
            }),
            selection_tx,
            storage,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of boxes in the grid
    pub fn slot_count(&self) -> usize {
        self.settings.slot_count
    }

    // === Selection ===

    /// Currently selected box, if any
    pub fn selected_index(&self) -> Option<usize> {
        self.read().selected
    }

    /// Select a box. Indices at or past the slot count are ignored.
    pub fn select_box(&self, index: usize) {
        if index >= self.settings.slot_count {
            debug!("Ignoring selection of box {} (slot count {})", index, self.settings.slot_count);
            return;
        }

        // Emit under the guard so the stream order matches the stored order
        let mut inner = self.write();
        inner.selected = Some(index);
        debug!("Selected box {}", index);
        self.emit_selection(Some(index));
    }

    /// Clear the selection
    pub fn clear_selected_index(&self) {
        let mut inner = self.write();
        inner.selected = None;
        debug!("Selection cleared");
        self.emit_selection(None);
    }

    /// Receive every selection change from now on
    pub fn subscribe_selection(&self) -> broadcast::Receiver<BoxEvent> {
        self.selection_tx.subscribe()
    }

    fn emit_selection(&self, index: Option<usize>) {
        // No receivers is fine: nobody is watching the selection yet
        let _ = self.selection_tx.send(BoxEvent::SelectionChanged(index));
    }

    // === Per-box channels ===

    /// Channel for one box, created on first use and reused afterwards
    pub fn box_channel(&self, index: usize) -> broadcast::Sender<BoxEvent> {
        if let Some(tx) = self.read().channels.get(&index) {
            return tx.clone();
        }

        let capacity = self.settings.channel_capacity.max(1);
        self.write()
            .channels
            .entry(index)
            .or_insert_with(|| {
                debug!("Created channel for box {}", index);
                broadcast::channel(capacity).0
            })
            .clone()
    }

    /// Receive value updates for one box from now on
    pub fn subscribe_box(&self, index: usize) -> broadcast::Receiver<BoxEvent> {
        self.box_channel(index).subscribe()
    }

    /// Boxes that have a channel
    pub fn channel_slots(&self) -> Vec<usize> {
        self.read().channels.keys().copied().collect()
    }

    pub fn channel_count(&self) -> usize {
        self.read().channels.len()
    }

    // === Values ===

    /// Publish a value to a box's subscribers. Keyed entries are also
    /// recorded in the aggregate map and the whole map is persisted.
    pub fn update_box_value(&self, index: usize, entry: BoxEntry) {
        let tx = self.box_channel(index);
        let keyed = entry.is_keyed();

        let event = BoxEvent::ValueUpdate {
            slot: index,
            entry: entry.clone(),
        };
        if tx.send(event).is_err() {
            debug!("No subscribers for box {}", index);
        }

        if !keyed {
            return;
        }

        let mut inner = self.write();
        inner.aggregate.insert(index, entry);
        self.persist(&inner.aggregate);
    }

    /// Send the same entry to every existing box channel
    pub fn broadcast_all(&self, entry: &BoxEntry) {
        let channels: Vec<(usize, broadcast::Sender<BoxEvent>)> = self
            .read()
            .channels
            .iter()
            .map(|(slot, tx)| (*slot, tx.clone()))
            .collect();

        for (slot, tx) in channels {
            let _ = tx.send(BoxEvent::ValueUpdate {
                slot,
                entry: entry.clone(),
            });
        }
    }

    // === Aggregate map ===

    /// Snapshot of the aggregate map
    pub fn aggregate(&self) -> BTreeMap<usize, BoxEntry> {
        self.read().aggregate.clone()
    }

    /// Stored entry for one box
    pub fn aggregate_entry(&self, index: usize) -> Option<BoxEntry> {
        self.read().aggregate.get(&index).cloned()
    }

    /// Empty the aggregate map without touching the persisted record
    pub fn clear_aggregate(&self) {
        self.write().aggregate.clear();
    }

    // === Persistence ===

    fn persist(&self, aggregate: &BTreeMap<usize, BoxEntry>) {
        let result = encode_record(aggregate)
            .and_then(|json| self.storage.write(&self.settings.record_key, &json));

        if let Err(e) = result {
            warn!("Failed to persist box record: {}", e);
        }
    }

    /// Read the persisted record. Missing or unreadable records yield no entries.
    pub fn load_record(&self) -> Vec<(usize, BoxEntry)> {
        let contents = match self.storage.read(&self.settings.record_key) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!("No persisted box record");
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read box record: {}", e);
                return Vec::new();
            }
        };

        match decode_record(&contents) {
            Ok(entries) => {
                info!("Loaded {} persisted boxes", entries.len());
                entries
            }
            Err(e) => {
                warn!("Ignoring malformed box record: {}", e);
                Vec::new()
            }
        }
    }

    /// Erase the persisted record
    pub fn erase_record(&self) {
        if let Err(e) = self.storage.remove(&self.settings.record_key) {
            warn!("Failed to erase box record: {}", e);
        }
    }
}
