#![forbid(unsafe_code)]

//! Undo/redo stack pair.
//!
//! [`History`] holds two stacks of [`Snapshot`]s and enforces the record /
//! undo / redo protocol. It never calls the originator: `undo` and `redo`
//! hand back the snapshot to restore and the caller (normally the
//! [`Controller`](crate::Controller)) applies it.
//!
//! # Invariants
//!
//! 1. `record` clears the redo stack unconditionally (branch invalidation).
//! 2. `undo_stack.len() <= config.max_depth` after any operation.
//! 3. A snapshot sits in exactly one slot of one stack; snapshots are
//!    moved, never duplicated.
//! 4. Every operation either fully applies or leaves both stacks unchanged.
//!
//! ```text
//! record(s2)
//! ┌────────────────────────────────────┐
//! │ Undo Stack:  [s0, s1, s2]          │
//! │ Redo Stack:  []                    │
//! └────────────────────────────────────┘
//!
//! undo() x2  (caller stashes live state c2, c1 on redo)
//! ┌────────────────────────────────────┐
//! │ Undo Stack:  [s0]                  │
//! │ Redo Stack:  [c2, c1]              │
//! └────────────────────────────────────┘
//!
//! record(s3)  <-- new branch, clears redo
//! ┌────────────────────────────────────┐
//! │ Undo Stack:  [s0, s3]              │
//! │ Redo Stack:  []                    │
//! └────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::config::HistoryConfig;
use crate::error::{Direction, NoHistory};
use crate::snapshot::Snapshot;

/// Coarse availability of undo/redo, derived purely from stack emptiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HistoryState {
    /// Both stacks empty.
    #[default]
    Clean,
    /// Only undo available.
    UndoOnly,
    /// Only redo available.
    RedoOnly,
    /// Both undo and redo available.
    Both,
}

impl HistoryState {
    #[must_use]
    pub const fn from_flags(can_undo: bool, can_redo: bool) -> Self {
        match (can_undo, can_redo) {
            (false, false) => Self::Clean,
            (true, false) => Self::UndoOnly,
            (false, true) => Self::RedoOnly,
            (true, true) => Self::Both,
        }
    }

    #[must_use]
    pub const fn can_undo(self) -> bool {
        matches!(self, Self::UndoOnly | Self::Both)
    }

    #[must_use]
    pub const fn can_redo(self) -> bool {
        matches!(self, Self::RedoOnly | Self::Both)
    }
}

impl fmt::Display for HistoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clean => "clean",
            Self::UndoOnly => "undo-only",
            Self::RedoOnly => "redo-only",
            Self::Both => "both",
        })
    }
}

/// Bounded undo/redo history of snapshots.
pub struct History<S> {
    /// Snapshots available for undo (most recent at back).
    undo_stack: VecDeque<Snapshot<S>>,
    /// Snapshots available for redo (most recent at back).
    redo_stack: VecDeque<Snapshot<S>>,
    config: HistoryConfig,
}

impl<S> fmt::Debug for History<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<S> History<S> {
    /// Create an empty history with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
        }
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// Push a snapshot onto the undo stack, discarding every redo snapshot.
    pub fn record(&mut self, snapshot: Snapshot<S>) {
        let discarded = self.redo_stack.len();
        self.redo_stack.clear();
        self.undo_stack.push_back(snapshot);
        self.enforce_depth();
        if discarded > 0 {
            tracing::trace!(
                target: "rewind.history",
                discarded,
                "redo branch invalidated"
            );
        }
    }

    /// Pop the most recent undo snapshot.
    ///
    /// Does not touch the redo stack; park the live state there with
    /// [`stash_redo`](Self::stash_redo) before restoring.
    pub fn undo(&mut self) -> Result<Snapshot<S>, NoHistory> {
        self.undo_stack.pop_back().ok_or(NoHistory {
            direction: Direction::Undo,
        })
    }

    /// Pop the most recent redo snapshot.
    pub fn redo(&mut self) -> Result<Snapshot<S>, NoHistory> {
        self.redo_stack.pop_back().ok_or(NoHistory {
            direction: Direction::Redo,
        })
    }

    /// Push onto the undo stack without invalidating the redo branch.
    pub fn stash_undo(&mut self, snapshot: Snapshot<S>) {
        self.undo_stack.push_back(snapshot);
        self.enforce_depth();
    }

    /// Push onto the redo stack.
    pub fn stash_redo(&mut self, snapshot: Snapshot<S>) {
        self.redo_stack.push_back(snapshot);
    }

    // ====================================================================
    // Query
    // ====================================================================

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn state(&self) -> HistoryState {
        HistoryState::from_flags(self.can_undo(), self.can_redo())
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    #[must_use]
    pub fn total_snapshots(&self) -> usize {
        self.undo_stack.len() + self.redo_stack.len()
    }

    /// The snapshot the next `undo` would return.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&Snapshot<S>> {
        self.undo_stack.back()
    }

    /// The snapshot the next `redo` would return.
    #[must_use]
    pub fn peek_redo(&self) -> Option<&Snapshot<S>> {
        self.redo_stack.back()
    }

    #[must_use]
    pub fn next_undo_label(&self) -> Option<&str> {
        self.undo_stack.back().and_then(Snapshot::label)
    }

    #[must_use]
    pub fn next_redo_label(&self) -> Option<&str> {
        self.redo_stack.back().and_then(Snapshot::label)
    }

    /// Labels on the undo stack, most recent first. Unlabeled entries are skipped.
    pub fn undo_labels(&self, limit: usize) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .take(limit)
            .filter_map(Snapshot::label)
            .collect()
    }

    /// Labels on the redo stack, most recent first. Unlabeled entries are skipped.
    pub fn redo_labels(&self, limit: usize) -> Vec<&str> {
        self.redo_stack
            .iter()
            .rev()
            .take(limit)
            .filter_map(Snapshot::label)
            .collect()
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ====================================================================
    // Maintenance
    // ====================================================================

    /// Drop every snapshot on both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Evict the oldest undo snapshots beyond `max_depth`.
    fn enforce_depth(&mut self) {
        while self.undo_stack.len() > self.config.max_depth {
            self.undo_stack.pop_front();
            tracing::trace!(
                target: "rewind.history",
                max_depth = self.config.max_depth,
                "evicted oldest snapshot"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::OriginId;

    fn snap(origin: OriginId, value: i32) -> Snapshot<i32> {
        Snapshot::new(origin, value)
    }

    fn history() -> (History<i32>, OriginId) {
        (History::new(HistoryConfig::unlimited()), OriginId::next())
    }

    #[test]
    fn new_history_is_clean() {
        let (history, _) = history();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.state(), HistoryState::Clean);
        assert_eq!(history.total_snapshots(), 0);
        assert!(history.peek_undo().is_none());
    }

    #[test]
    fn record_enables_undo() {
        let (mut history, o) = history();
        history.record(snap(o, 1));
        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.state(), HistoryState::UndoOnly);
        assert_eq!(history.peek_undo().map(Snapshot::state), Some(&1));
    }

    #[test]
    fn undo_pops_most_recent() {
        let (mut history, o) = history();
        history.record(snap(o, 1));
        history.record(snap(o, 2));
        assert_eq!(history.undo().unwrap().into_state(), 2);
        assert_eq!(history.undo().unwrap().into_state(), 1);
        assert_eq!(
            history.undo().unwrap_err(),
            NoHistory {
                direction: Direction::Undo
            }
        );
    }

    #[test]
    fn undo_does_not_touch_redo() {
        let (mut history, o) = history();
        history.record(snap(o, 1));
        history.undo().unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.state(), HistoryState::Clean);
    }

    #[test]
    fn redo_on_empty_fails() {
        let (mut history, _) = history();
        assert_eq!(
            history.redo().unwrap_err().direction,
            Direction::Redo
        );
        assert_eq!(history.state(), HistoryState::Clean);
    }

    #[test]
    fn record_clears_redo() {
        let (mut history, o) = history();
        history.record(snap(o, 1));
        let target = history.undo().unwrap();
        history.stash_redo(snap(o, 2));
        assert_eq!(history.state(), HistoryState::RedoOnly);
        drop(target);

        history.record(snap(o, 3));
        assert!(!history.can_redo());
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(history.state(), HistoryState::UndoOnly);
    }

    #[test]
    fn stash_undo_keeps_redo() {
        let (mut history, o) = history();
        history.stash_redo(snap(o, 9));
        history.stash_undo(snap(o, 1));
        assert_eq!(history.state(), HistoryState::Both);
        assert_eq!(history.redo().unwrap().into_state(), 9);
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let o = OriginId::next();
        let mut history = History::new(HistoryConfig::new(3));
        for v in 1..=4 {
            history.record(snap(o, v));
        }
        assert_eq!(history.undo_depth(), 3);
        assert_eq!(history.undo().unwrap().into_state(), 4);
        assert_eq!(history.undo().unwrap().into_state(), 3);
        assert_eq!(history.undo().unwrap().into_state(), 2);
        assert!(history.undo().is_err());
    }

    #[test]
    fn depth_limit_zero_keeps_nothing() {
        let o = OriginId::next();
        let mut history = History::new(HistoryConfig::new(0));
        history.record(snap(o, 42));
        assert!(!history.can_undo());
    }

    #[test]
    fn clear_removes_all() {
        let (mut history, o) = history();
        history.record(snap(o, 1));
        history.record(snap(o, 2));
        history.stash_redo(snap(o, 3));
        history.clear();
        assert_eq!(history.state(), HistoryState::Clean);
        assert_eq!(history.total_snapshots(), 0);
    }

    #[test]
    fn labels_most_recent_first() {
        let (mut history, o) = history();
        history.record(snap(o, 0).with_label("first"));
        history.record(snap(o, 1));
        history.record(snap(o, 2).with_label("third"));
        assert_eq!(history.next_undo_label(), Some("third"));
        assert_eq!(history.undo_labels(10), vec!["third", "first"]);
        assert_eq!(history.undo_labels(1), vec!["third"]);
        assert!(history.redo_labels(10).is_empty());
        assert_eq!(history.next_redo_label(), None);

        history.stash_redo(snap(o, 5).with_label("redo me"));
        assert_eq!(history.next_redo_label(), Some("redo me"));
        assert_eq!(history.peek_redo().map(Snapshot::state), Some(&5));
    }

    #[test]
    fn history_state_flags() {
        for (u, r) in [(false, false), (true, false), (false, true), (true, true)] {
            let state = HistoryState::from_flags(u, r);
            assert_eq!(state.can_undo(), u);
            assert_eq!(state.can_redo(), r);
        }
        assert_eq!(HistoryState::default(), HistoryState::Clean);
        assert_eq!(HistoryState::Both.to_string(), "both");
    }

    #[test]
    fn debug_hides_contents() {
        let (mut history, o) = history();
        history.record(snap(o, 31337));
        let s = format!("{history:?}");
        assert!(s.contains("History"));
        assert!(s.contains("undo_depth"));
        assert!(!s.contains("31337"));
    }
}
