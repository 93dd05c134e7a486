mod event;
mod store;

pub use event::{BoxEntry, BoxEvent};
pub use store::{BoxStore, StoreSettings, DEFAULT_CHANNEL_CAPACITY, DEFAULT_SLOT_COUNT};
