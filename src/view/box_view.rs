use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tracing::{debug, warn};

use crate::state::{BoxEvent, BoxStore};

/// Live view of one box: its value and whether it is selected.
///
/// Holds receivers on the box's channel and the selection channel. Dropping
/// or retiring the view releases both; nothing is delivered afterwards.
pub struct BoxView {
    store: Arc<BoxStore>,
    index: usize,
    value: String,
    key: Option<u32>,
    selected: Option<usize>,
    box_rx: Receiver<BoxEvent>,
    selection_rx: Receiver<BoxEvent>,
}

impl BoxView {
    /// Subscribe to box `index` and to selection changes
    pub fn attach(store: Arc<BoxStore>, index: usize) -> Self {
        let box_rx = store.subscribe_box(index);
        let selection_rx = store.subscribe_selection();
        let selected = store.selected_index();

        Self {
            store,
            index,
            value: String::new(),
            key: None,
            selected,
            box_rx,
            selection_rx,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Label currently shown in the box
    pub fn current_value(&self) -> &str {
        &self.value
    }

    /// Key id currently shown in the box
    pub fn current_key(&self) -> Option<u32> {
        self.key
    }

    pub fn is_selected(&self) -> bool {
        self.selected == Some(self.index)
    }

    /// Make this box the selected one
    pub fn on_click(&self) {
        self.store.select_box(self.index);
    }

    /// Apply every pending event without waiting. Returns how many were applied.
    pub fn sync(&mut self) -> usize {
        let mut pending = Vec::new();
        drain(&mut self.box_rx, self.index, &mut pending);
        drain(&mut self.selection_rx, self.index, &mut pending);

        for event in &pending {
            self.apply(event);
        }
        pending.len()
    }

    /// Wait for the next event on either channel and apply it.
    /// Returns `None` once the store has gone away.
    pub async fn next_event(&mut self) -> Option<BoxEvent> {
        loop {
            let result = tokio::select! {
                r = self.box_rx.recv() => r,
                r = self.selection_rx.recv() => r,
            };

            match result {
                Ok(event) => {
                    self.apply(&event);
                    return Some(event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Box {} view lagged, skipped {} events", self.index, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn apply(&mut self, event: &BoxEvent) {
        match event {
            BoxEvent::ValueUpdate { slot, entry } if *slot == self.index => {
                self.value = entry.label.clone();
                self.key = entry.key;
            }
            BoxEvent::ValueUpdate { slot, .. } => {
                debug!("Box {} view ignoring update for box {}", self.index, slot);
            }
            BoxEvent::SelectionChanged(selected) => {
                self.selected = *selected;
            }
        }
    }

    /// Release both subscriptions
    pub fn retire(self) {
        debug!("Box {} view retired", self.index);
    }
}

fn drain(rx: &mut Receiver<BoxEvent>, index: usize, out: &mut Vec<BoxEvent>) {
    loop {
        match rx.try_recv() {
            Ok(event) => out.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("Box {} view lagged, skipped {} events", index, skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}
