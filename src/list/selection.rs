use std::hash::Hash;

use indexmap::IndexSet;

/// Interaction phase for a list region. `Selecting` is what the UI calls
/// multi-select mode; it is entered by a long-press gesture and left as soon
/// as the selection becomes empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Selecting,
}

/// Emitted whenever the selection actually changes. Callers surface the
/// count ("3 selected") however they see fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEvent {
    pub count: usize,
}

/// Tracks which items of a bound collection are selected, keyed by the
/// item's identity rather than the item itself.
///
/// Events are plain return values and are produced only when a call changes
/// state. That makes re-entrant emission (a notification handler calling
/// back into `clear`) structurally impossible, so no guard flag is needed.
#[derive(Debug, Clone)]
pub struct SelectionTracker<K> {
    selected: IndexSet<K>,
    phase: SelectionPhase,
}

impl<K> Default for SelectionTracker<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> SelectionTracker<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            selected: IndexSet::new(),
            phase: SelectionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn is_multi_select(&self) -> bool {
        self.phase == SelectionPhase::Selecting
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    /// Selected keys in the order they were selected.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }

    pub fn any_satisfies<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&K) -> bool,
    {
        self.selected.iter().any(|key| predicate(key))
    }

    /// Enters multi-select with `key` as the first selected item. Only valid
    /// from `Idle`; a stray long-press while already selecting is ignored.
    pub fn enter_multi_select(&mut self, key: K) -> Option<SelectionEvent> {
        if self.phase != SelectionPhase::Idle {
            return None;
        }
        self.phase = SelectionPhase::Selecting;
        self.selected.insert(key);
        Some(SelectionEvent { count: 1 })
    }

    /// Toggles membership of `key` while selecting. Deselecting the last
    /// item drops back to `Idle` and still reports the zero count.
    pub fn toggle(&mut self, key: K) -> Option<SelectionEvent> {
        if self.phase != SelectionPhase::Selecting {
            return None;
        }
        if !self.selected.shift_remove(&key) {
            self.selected.insert(key);
        }
        if self.selected.is_empty() {
            self.phase = SelectionPhase::Idle;
        }
        Some(SelectionEvent {
            count: self.selected.len(),
        })
    }

    /// Resets to `Idle`. Emits the zero count only when there was something
    /// to clear, so repeated or nested calls are absorbed as no-ops.
    pub fn clear(&mut self) -> Option<SelectionEvent> {
        if self.phase == SelectionPhase::Idle && self.selected.is_empty() {
            return None;
        }
        self.selected.clear();
        self.phase = SelectionPhase::Idle;
        Some(SelectionEvent { count: 0 })
    }

    /// Drops selected keys that no longer pass `keep`. Used after structural
    /// mutations so the selection never references a removed item.
    pub fn retain<F>(&mut self, mut keep: F) -> Option<SelectionEvent>
    where
        F: FnMut(&K) -> bool,
    {
        let before = self.selected.len();
        self.selected.retain(|key| keep(key));
        if self.selected.len() == before {
            return None;
        }
        if self.selected.is_empty() {
            self.phase = SelectionPhase::Idle;
        }
        Some(SelectionEvent {
            count: self.selected.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn long_press_enters_multi_select_with_count_one() {
        let mut tracker = SelectionTracker::new();
        let event = tracker.enter_multi_select("a");
        assert_matches!(event, Some(SelectionEvent { count: 1 }));
        assert!(tracker.is_multi_select());
        assert!(tracker.contains(&"a"));
    }

    #[test]
    fn long_press_while_selecting_is_ignored() {
        let mut tracker = SelectionTracker::new();
        tracker.enter_multi_select("a");
        assert_eq!(tracker.enter_multi_select("b"), None);
        assert_eq!(tracker.count(), 1);
    }

    #[test]
    fn toggling_last_item_returns_to_idle() {
        let mut tracker = SelectionTracker::new();
        assert_matches!(
            tracker.enter_multi_select("a"),
            Some(SelectionEvent { count: 1 })
        );
        let event = tracker.toggle("a");
        assert_matches!(event, Some(SelectionEvent { count: 0 }));
        assert_eq!(tracker.phase(), SelectionPhase::Idle);
        assert!(!tracker.is_multi_select());
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut tracker = SelectionTracker::new();
        tracker.enter_multi_select(1);
        assert_matches!(tracker.toggle(2), Some(SelectionEvent { count: 2 }));
        assert_matches!(tracker.toggle(2), Some(SelectionEvent { count: 1 }));
        assert!(tracker.contains(&1));
        assert!(!tracker.contains(&2));
    }

    #[test]
    fn toggle_outside_multi_select_is_a_no_op() {
        let mut tracker: SelectionTracker<&str> = SelectionTracker::new();
        assert_eq!(tracker.toggle("a"), None);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn clear_emits_once_and_is_idempotent() {
        let mut tracker = SelectionTracker::new();
        tracker.enter_multi_select("a");
        tracker.toggle("b");

        let first = tracker.clear();
        assert_matches!(first, Some(SelectionEvent { count: 0 }));
        // A nested or repeated clear (e.g. from a notification callback)
        // observes no state change and emits nothing.
        assert_eq!(tracker.clear(), None);
        assert_eq!(tracker.phase(), SelectionPhase::Idle);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn retain_drops_stale_keys_and_reports_new_count() {
        let mut tracker = SelectionTracker::new();
        tracker.enter_multi_select(1);
        tracker.toggle(2);
        tracker.toggle(3);

        let event = tracker.retain(|key| *key != 2);
        assert_matches!(event, Some(SelectionEvent { count: 2 }));

        let event = tracker.retain(|_| false);
        assert_matches!(event, Some(SelectionEvent { count: 0 }));
        assert_eq!(tracker.phase(), SelectionPhase::Idle);

        assert_eq!(tracker.retain(|_| true), None);
    }

    #[test]
    fn keys_preserve_selection_order() {
        let mut tracker = SelectionTracker::new();
        tracker.enter_multi_select("b");
        tracker.toggle("a");
        tracker.toggle("c");
        let keys: Vec<_> = tracker.keys().copied().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn any_satisfies_scans_selected_keys() {
        let mut tracker = SelectionTracker::new();
        tracker.enter_multi_select(10);
        tracker.toggle(25);
        assert!(tracker.any_satisfies(|key| *key > 20));
        assert!(!tracker.any_satisfies(|key| *key > 30));
    }
}
