//! List state engine: live filtering, multi-selection, and the controller
//! binding a full collection to its displayed subsequence.

use std::hash::Hash;

pub mod controller;
pub mod debounce;
pub mod filter;
pub mod selection;

pub use controller::{CollectionStore, ListController};
pub use debounce::{NoticeTimer, NoticeToken, NO_MATCH_DELAY};
pub use filter::{filter_items, normalize_query, FilterOutcome};
pub use selection::{SelectionEvent, SelectionPhase, SelectionTracker};

/// An item that can live in a searchable, selectable list. The key is the
/// item's stable identity; the title is what queries match against.
pub trait ListItem: Clone {
    type Key: Eq + Hash + Clone + std::fmt::Debug;

    fn key(&self) -> Self::Key;
    fn search_title(&self) -> &str;
}
