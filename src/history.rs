//! Linear undo/redo history for a single document.
//!
//! The history keeps one `present` value between two sequences: `past`
//! (oldest first) and `future` (the next redo first). Committing a new value
//! discards `future`; there is no branching.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Undo/redo state over snapshots of type `T`.
#[derive(Debug, Clone)]
pub struct HistoryManager<T> {
    past: VecDeque<T>,
    present: Option<T>,
    future: VecDeque<T>,
    /// Maximum length of `past`; `None` keeps every state.
    limit: Option<NonZeroUsize>,
}

impl<T> Default for HistoryManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HistoryManager<T> {
    /// Creates an empty, unbounded history.
    pub fn new() -> Self {
        Self {
            past: VecDeque::new(),
            present: None,
            future: VecDeque::new(),
            limit: None,
        }
    }

    /// Creates an empty history that keeps at most `limit` undo steps.
    ///
    /// When a commit pushes `past` beyond the limit, the oldest state is
    /// dropped.
    pub fn with_limit(limit: Option<NonZeroUsize>) -> Self {
        Self {
            limit,
            ..Self::new()
        }
    }

    /// Records `next` as the present state.
    pub fn commit(&mut self, next: T) {
        if let Some(prev) = self.present.replace(next) {
            self.past.push_back(prev);
            if let Some(limit) = self.limit {
                while self.past.len() > limit.get() {
                    self.past.pop_front();
                }
            }
        }
        self.future.clear();
    }

    /// Steps back one state. Returns the new present, or `None` if there was
    /// nothing to undo.
    pub fn undo(&mut self) -> Option<&T> {
        let prev = self.past.pop_back()?;
        if let Some(current) = self.present.replace(prev) {
            self.future.push_front(current);
        }
        self.present.as_ref()
    }

    /// Steps forward one state. Returns the new present, or `None` if there
    /// was nothing to redo.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.future.pop_front()?;
        if let Some(current) = self.present.replace(next) {
            self.past.push_back(current);
        }
        self.present.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Forgets everything, including the present state.
    pub fn clear(&mut self) {
        self.past.clear();
        self.present = None;
        self.future.clear();
    }

    pub fn present(&self) -> Option<&T> {
        self.present.as_ref()
    }

    /// Earlier states, oldest first.
    pub fn past(&self) -> impl ExactSizeIterator<Item = &T> {
        self.past.iter()
    }

    /// Undone states, the next redo first.
    pub fn future(&self) -> impl ExactSizeIterator<Item = &T> {
        self.future.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(values: &[&'static str]) -> HistoryManager<&'static str> {
        let mut h = HistoryManager::new();
        for v in values {
            h.commit(*v);
        }
        h
    }

    type Parts = (Vec<&'static str>, Option<&'static str>, Vec<&'static str>);

    fn snapshot(h: &HistoryManager<&'static str>) -> Parts {
        (
            h.past().copied().collect(),
            h.present().copied(),
            h.future().copied().collect(),
        )
    }

    #[test]
    fn new_history_is_empty() {
        let h: HistoryManager<u32> = HistoryManager::new();
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert!(h.present().is_none());
    }

    #[test]
    fn first_commit_only_sets_present() {
        let h = history(&["d1"]);
        assert_eq!(snapshot(&h), (vec![], Some("d1"), vec![]));
    }

    #[test]
    fn commit_never_leaves_redo_available() {
        let mut h = HistoryManager::new();
        for v in ["a", "b", "c"] {
            h.commit(v);
            assert!(!h.can_redo());
        }
        h.undo();
        h.undo();
        assert!(h.can_redo());
        h.commit("d");
        assert!(!h.can_redo());
    }

    #[test]
    fn undo_then_commit_discards_redo_branch() {
        let mut h = history(&["d1", "d2"]);
        assert_eq!(h.undo(), Some(&"d1"));
        assert_eq!(snapshot(&h), (vec![], Some("d1"), vec!["d2"]));

        h.commit("d3");
        assert_eq!(snapshot(&h), (vec!["d1"], Some("d3"), vec![]));
    }

    #[test]
    fn undo_then_redo_restores_state() {
        let mut h = history(&["a", "b", "c", "d"]);
        h.undo();
        let before = snapshot(&h);

        h.undo();
        assert_eq!(h.redo(), Some(&"c"));
        assert_eq!(snapshot(&h), before);
    }

    #[test]
    fn future_is_nearest_first() {
        let mut h = history(&["a", "b", "c"]);
        h.undo();
        h.undo();
        assert_eq!(snapshot(&h), (vec![], Some("a"), vec!["b", "c"]));
    }

    #[test]
    fn undo_on_empty_past_is_noop() {
        let mut h = history(&["only"]);
        let before = snapshot(&h);
        assert!(h.undo().is_none());
        assert_eq!(snapshot(&h), before);

        let mut empty: HistoryManager<&'static str> = HistoryManager::new();
        assert!(empty.undo().is_none());
        assert_eq!(snapshot(&empty), (vec![], None, vec![]));
    }

    #[test]
    fn redo_on_empty_future_is_noop() {
        let mut h = history(&["a", "b"]);
        let before = snapshot(&h);
        assert!(h.redo().is_none());
        assert_eq!(snapshot(&h), before);
    }

    #[test]
    fn clear_resets_everything() {
        let mut h = history(&["a", "b", "c"]);
        h.undo();
        h.clear();
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert!(h.present().is_none());
    }

    #[test]
    fn limit_drops_oldest_states() {
        let mut h = HistoryManager::with_limit(NonZeroUsize::new(2));
        for v in ["a", "b", "c", "d"] {
            h.commit(v);
        }
        assert_eq!(snapshot(&h), (vec!["b", "c"], Some("d"), vec![]));

        h.undo();
        h.undo();
        assert!(!h.can_undo());
        assert_eq!(h.present(), Some(&"b"));
    }
}
