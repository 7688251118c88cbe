use std::collections::HashSet;

use anyhow::Result;

use crate::list::filter::{self, FilterOutcome};
use crate::list::selection::{SelectionEvent, SelectionTracker};
use crate::list::ListItem;

/// Persistence seam for one list region. Implementations are expected to
/// durably apply the mutation before returning; the controller only commits
/// its in-memory state after the store call succeeds, so a failed write
/// leaves the displayed state equal to what was actually persisted.
pub trait CollectionStore<T> {
    /// Persists a newly created item and returns its stored form (stores
    /// that assign identifiers do so here).
    fn insert(&mut self, item: T) -> Result<T>;

    /// Persists removal of the given items.
    fn remove(&mut self, items: &[T]) -> Result<()>;

    /// Persists a full replace of an existing item, matched by identity, and
    /// returns its stored form (stores that refresh fields at write time do
    /// so here).
    fn update(&mut self, item: &T) -> Result<T>;
}

/// Binds a full collection to the displayed subsequence for one screen
/// region, reconciling live filtering with multi-selection and routing every
/// structural mutation through the backing store exactly once.
///
/// The full collection is copied in on `bind`; the screen-level owner is
/// expected to re-bind on resume rather than mutate behind the controller's
/// back.
#[derive(Debug)]
pub struct ListController<T: ListItem> {
    full: Vec<T>,
    displayed: Vec<T>,
    query: String,
    selection: SelectionTracker<T::Key>,
}

impl<T: ListItem> Default for ListController<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ListItem> ListController<T> {
    pub fn new() -> Self {
        Self {
            full: Vec::new(),
            displayed: Vec::new(),
            query: String::new(),
            selection: SelectionTracker::new(),
        }
    }

    /// Replaces the bound collection. Resets the displayed subsequence to
    /// the whole collection and drops any query and selection.
    pub fn bind(&mut self, full: Vec<T>) {
        self.displayed = full.clone();
        self.full = full;
        self.query.clear();
        self.selection.clear();
    }

    pub fn full(&self) -> &[T] {
        &self.full
    }

    pub fn displayed(&self) -> &[T] {
        &self.displayed
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selection(&self) -> &SelectionTracker<T::Key> {
        &self.selection
    }

    pub fn is_multi_select(&self) -> bool {
        self.selection.is_multi_select()
    }

    /// Recomputes the displayed subsequence for `query`. Never touches the
    /// store and never drops the selection; returns whether anything
    /// matched.
    pub fn set_query(&mut self, query: &str) -> bool {
        let FilterOutcome { result, has_match } =
            filter::filter_items(&self.full, query, |item, needle| {
                filter::title_contains(item.search_title(), needle)
            });
        self.displayed = result;
        self.query = query.to_string();
        has_match
    }

    /// Appends `item` after persisting it. The displayed subsequence picks
    /// it up only when it matches the live query. Selection is untouched.
    pub fn add<S>(&mut self, store: &mut S, item: T) -> Result<T>
    where
        S: CollectionStore<T>,
    {
        let stored = store.insert(item)?;
        self.full.push(stored.clone());
        let needle = filter::normalize_query(&self.query);
        if needle.is_empty() || filter::title_contains(stored.search_title(), &needle) {
            self.displayed.push(stored.clone());
        }
        Ok(stored)
    }

    /// Removes the items with the given keys. Keys that do not refer to a
    /// bound item are silently skipped; when nothing is present this is a
    /// complete no-op and the store is not called. Returns the number of
    /// items removed, plus a selection event when the removal shrank the
    /// selection.
    pub fn remove<S>(
        &mut self,
        store: &mut S,
        keys: &[T::Key],
    ) -> Result<(usize, Option<SelectionEvent>)>
    where
        S: CollectionStore<T>,
    {
        let wanted: HashSet<&T::Key> = keys.iter().collect();
        let present: Vec<T> = self
            .full
            .iter()
            .filter(|item| wanted.contains(&item.key()))
            .cloned()
            .collect();
        if present.is_empty() {
            return Ok((0, None));
        }

        store.remove(&present)?;

        let removed: HashSet<T::Key> = present.iter().map(ListItem::key).collect();
        self.full.retain(|item| !removed.contains(&item.key()));
        self.displayed.retain(|item| !removed.contains(&item.key()));
        let event = self.selection.retain(|key| !removed.contains(key));
        Ok((present.len(), event))
    }

    /// Replaces the bound item with the same identity as `updated`, in both
    /// the full and displayed sequences, with the form the store reports
    /// back. The query and selection are untouched. Updating an item that is
    /// no longer bound is a silent no-op (benign UI race) and makes no store
    /// call.
    pub fn update_item<S>(&mut self, store: &mut S, updated: T) -> Result<Option<T>>
    where
        S: CollectionStore<T>,
    {
        let key = updated.key();
        if !self.full.iter().any(|item| item.key() == key) {
            tracing::debug!("update for unbound item ignored");
            return Ok(None);
        }

        let stored = store.update(&updated)?;

        for item in &mut self.full {
            if item.key() == key {
                *item = stored.clone();
            }
        }
        for item in &mut self.displayed {
            if item.key() == key {
                *item = stored.clone();
            }
        }
        Ok(Some(stored))
    }

    /// Long-press gesture: enters multi-select with `key`. Ignored when the
    /// key is not bound (stale gesture) or multi-select is already active.
    pub fn enter_multi_select(&mut self, key: T::Key) -> Option<SelectionEvent> {
        if !self.is_bound(&key) {
            return None;
        }
        self.selection.enter_multi_select(key)
    }

    /// Tap gesture while selecting: toggles membership of `key`.
    pub fn toggle_selection(&mut self, key: T::Key) -> Option<SelectionEvent> {
        if !self.is_bound(&key) {
            return None;
        }
        self.selection.toggle(key)
    }

    pub fn clear_selection(&mut self) -> Option<SelectionEvent> {
        self.selection.clear()
    }

    /// Selected items in selection order, resolved against the full
    /// collection.
    pub fn selected_items(&self) -> Vec<T> {
        self.selection
            .keys()
            .filter_map(|key| self.full.iter().find(|item| item.key() == *key))
            .cloned()
            .collect()
    }

    /// Whether any selected item satisfies `predicate`. Drives e.g. hiding
    /// the "mark complete" action when a completed task is selected.
    pub fn any_selected_satisfies<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.selection.any_satisfies(|key| {
            self.full
                .iter()
                .find(|item| item.key() == *key)
                .is_some_and(&mut predicate)
        })
    }

    fn is_bound(&self, key: &T::Key) -> bool {
        self.full.iter().any(|item| item.key() == *key)
    }
}
