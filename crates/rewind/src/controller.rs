#![forbid(unsafe_code)]

//! Orchestration of capture, record, and restore.
//!
//! The [`Controller`] is the only place that talks to both the
//! [`Originator`] and the [`History`]. It guarantees:
//!
//! - The pre-mutation state is captured and recorded **before** a mutation
//!   runs, so `undo()` returns to the state before the most recent change.
//! - `undo()`/`redo()` results are applied to the originator before control
//!   returns to the caller.
//! - A failed `undo()`/`redo()` never mutates the originator and leaves
//!   both stacks exactly as they were.
//!
//! # Undo Sequence
//!
//! ```text
//! target  = history.undo()        // NoHistory -> return, nothing touched
//! current = originator.capture()  // label carried over from target
//! originator.restore(target)      // ForeignSnapshot -> push target back
//! history.stash_redo(current)
//! ```

use std::fmt;

use crate::config::HistoryConfig;
use crate::error::{Direction, HistoryError};
use crate::history::{History, HistoryState};
use crate::observer::{HistoryEvent, HistoryObserver, ObserverId, Observers};
use crate::originator::Originator;
use crate::snapshot::Snapshot;

/// Drives an [`Originator`] through a bounded undo/redo [`History`].
pub struct Controller<O: Originator> {
    originator: O,
    history: History<O::State>,
    observers: Observers,
    /// `Some` while owned by a [`SharedController`](crate::SharedController),
    /// which delivers the queued events after releasing its lock.
    pending: Option<Vec<HistoryEvent>>,
}

impl<O> fmt::Debug for Controller<O>
where
    O: Originator + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("originator", &self.originator)
            .field("history", &self.history)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<O: Originator> Controller<O> {
    /// Wrap `originator` with an empty history.
    #[must_use]
    pub fn new(originator: O, config: HistoryConfig) -> Self {
        Self {
            originator,
            history: History::new(config),
            observers: Observers::default(),
            pending: None,
        }
    }

    // ====================================================================
    // Recording
    // ====================================================================

    /// Record the current state without mutating anything.
    ///
    /// Use this when a mutation happens outside [`apply`](Self::apply) and
    /// the pre-state must still be undoable. Call it *before* mutating.
    pub fn checkpoint(&mut self) {
        self.record(None);
    }

    /// Like [`checkpoint`](Self::checkpoint), describing the coming change.
    pub fn checkpoint_labeled(&mut self, label: impl Into<String>) {
        self.record(Some(label.into()));
    }

    /// Record the pre-mutation state, then run `mutate`.
    pub fn apply<F, R>(&mut self, mutate: F) -> R
    where
        F: FnOnce(&mut O) -> R,
    {
        self.record(None);
        mutate(&mut self.originator)
    }

    /// Like [`apply`](Self::apply), describing the change for UI display.
    pub fn apply_labeled<F, R>(&mut self, label: impl Into<String>, mutate: F) -> R
    where
        F: FnOnce(&mut O) -> R,
    {
        self.record(Some(label.into()));
        mutate(&mut self.originator)
    }

    fn record(&mut self, label: Option<String>) {
        let discarded = self.history.redo_depth();
        let snapshot = self.originator.capture().relabel(label.clone());
        self.history.record(snapshot);

        let state = self.history.state();
        tracing::debug!(
            target: "rewind.history",
            origin = %self.originator.origin(),
            label = label.as_deref().unwrap_or(""),
            discarded,
            undo_depth = self.history.undo_depth(),
            "snapshot recorded"
        );
        self.emit(HistoryEvent::Recorded {
            label,
            discarded,
            state,
        });
    }

    // ====================================================================
    // Traversal
    // ====================================================================

    /// Restore the state before the most recent recorded change.
    ///
    /// Returns the resulting [`HistoryState`]. On error nothing changes.
    pub fn undo(&mut self) -> Result<HistoryState, HistoryError> {
        let _span = tracing::debug_span!("history.undo").entered();
        self.step(Direction::Undo)
    }

    /// Re-apply the most recently undone change.
    ///
    /// Returns the resulting [`HistoryState`]. On error nothing changes.
    pub fn redo(&mut self) -> Result<HistoryState, HistoryError> {
        let _span = tracing::debug_span!("history.redo").entered();
        self.step(Direction::Redo)
    }

    fn step(&mut self, direction: Direction) -> Result<HistoryState, HistoryError> {
        let popped = match direction {
            Direction::Undo => self.history.undo(),
            Direction::Redo => self.history.redo(),
        };
        let target = match popped {
            Ok(target) => target,
            Err(err) => {
                let state = self.history.state();
                tracing::debug!(
                    target: "rewind.history",
                    direction = %direction,
                    state = %state,
                    "nothing to step to"
                );
                self.emit(HistoryEvent::Rejected { direction, state });
                return Err(err.into());
            }
        };

        let label = target.label().map(str::to_owned);
        let current = self.originator.capture().relabel(label.clone());

        if let Err(foreign) = self.originator.restore(target) {
            tracing::warn!(
                target: "rewind.history",
                direction = %direction,
                expected = %foreign.expected,
                found = %foreign.found,
                "foreign snapshot rejected"
            );
            let (expected, found) = (foreign.expected, foreign.found);
            self.stash(direction, foreign.into_snapshot());
            let state = self.history.state();
            self.emit(HistoryEvent::Rejected { direction, state });
            return Err(HistoryError::ForeignSnapshot { expected, found });
        }

        self.stash(direction.reverse(), current);

        let state = self.history.state();
        tracing::debug!(
            target: "rewind.history",
            direction = %direction,
            label = label.as_deref().unwrap_or(""),
            undo_depth = self.history.undo_depth(),
            redo_depth = self.history.redo_depth(),
            "snapshot restored"
        );
        let event = match direction {
            Direction::Undo => HistoryEvent::Undone { label, state },
            Direction::Redo => HistoryEvent::Redone { label, state },
        };
        self.emit(event);
        Ok(state)
    }

    /// Push onto the stack that `direction` pops from, keeping the redo branch.
    fn stash(&mut self, direction: Direction, snapshot: Snapshot<O::State>) {
        match direction {
            Direction::Undo => self.history.stash_undo(snapshot),
            Direction::Redo => self.history.stash_redo(snapshot),
        }
    }

    // ====================================================================
    // Query
    // ====================================================================

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    /// Read-only view of the stacks.
    #[must_use]
    pub fn history(&self) -> &History<O::State> {
        &self.history
    }

    /// The live originator.
    #[must_use]
    pub fn originator(&self) -> &O {
        &self.originator
    }

    /// Consume the controller, dropping history and yielding the originator.
    #[must_use]
    pub fn into_inner(self) -> O {
        self.originator
    }

    // ====================================================================
    // Maintenance
    // ====================================================================

    /// Drop all history. The live state is untouched.
    pub fn clear_history(&mut self) {
        self.history.clear();
        tracing::debug!(target: "rewind.history", "history cleared");
        self.emit(HistoryEvent::Cleared);
    }

    /// Register an observer for every subsequent history event.
    pub fn subscribe(&mut self, observer: Box<dyn HistoryObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn emit(&mut self, event: HistoryEvent) {
        match &mut self.pending {
            Some(queue) => queue.push(event),
            None => self.observers.notify(&event),
        }
    }

    // ====================================================================
    // Shared delivery
    // ====================================================================

    /// Queue events instead of notifying observers in place.
    pub(crate) fn defer_events(&mut self) {
        self.pending.get_or_insert_with(Vec::new);
    }

    /// Events queued since the last call.
    pub(crate) fn take_events(&mut self) -> Vec<HistoryEvent> {
        self.pending.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Hand over every registered observer.
    pub(crate) fn take_observers(&mut self) -> Observers {
        std::mem::take(&mut self.observers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForeignSnapshot;
    use crate::originator::Subject;
    use crate::snapshot::OriginId;
    use std::sync::{Arc, Mutex};

    fn text_controller() -> Controller<Subject<String>> {
        Controller::new(Subject::new(String::new()), HistoryConfig::unlimited())
    }

    fn text(ctl: &Controller<Subject<String>>) -> &str {
        ctl.originator().state()
    }

    #[test]
    fn concrete_scenario() {
        let mut ctl = text_controller();
        ctl.apply(|s| s.state_mut().push('A'));
        ctl.apply(|s| s.state_mut().push('B'));
        assert_eq!(text(&ctl), "AB");

        ctl.undo().unwrap();
        assert_eq!(text(&ctl), "A");
        ctl.undo().unwrap();
        assert_eq!(text(&ctl), "");
        assert_eq!(
            ctl.undo(),
            Err(HistoryError::NoHistory {
                direction: Direction::Undo
            })
        );
        assert_eq!(text(&ctl), "");

        ctl.redo().unwrap();
        assert_eq!(text(&ctl), "A");
        ctl.redo().unwrap();
        assert_eq!(text(&ctl), "AB");
        assert_eq!(
            ctl.redo(),
            Err(HistoryError::NoHistory {
                direction: Direction::Redo
            })
        );
        assert_eq!(text(&ctl), "AB");
    }

    #[test]
    fn apply_captures_before_mutating() {
        let mut ctl = text_controller();
        ctl.apply(|s| s.state_mut().push_str("changed"));
        assert_eq!(ctl.history().peek_undo().map(|s| s.state().as_str()), Some(""));
    }

    #[test]
    fn apply_returns_closure_result() {
        let mut ctl = text_controller();
        let len = ctl.apply(|s| {
            s.state_mut().push_str("abc");
            s.state().len()
        });
        assert_eq!(len, 3);
    }

    #[test]
    fn undo_reports_resulting_state() {
        let mut ctl = text_controller();
        ctl.apply(|s| s.state_mut().push('x'));
        ctl.apply(|s| s.state_mut().push('y'));
        assert_eq!(ctl.undo(), Ok(HistoryState::Both));
        assert_eq!(ctl.undo(), Ok(HistoryState::RedoOnly));
        assert_eq!(ctl.redo(), Ok(HistoryState::Both));
    }

    #[test]
    fn branch_invalidation() {
        let mut ctl = text_controller();
        ctl.apply(|s| s.state_mut().push('A'));
        ctl.undo().unwrap();
        assert!(ctl.can_redo());

        ctl.apply(|s| s.state_mut().push('Z'));
        assert!(!ctl.can_redo());
        assert!(ctl.redo().is_err());
        assert_eq!(text(&ctl), "Z");
    }

    #[test]
    fn checkpoint_records_without_mutating() {
        let mut ctl = text_controller();
        ctl.checkpoint();
        assert!(ctl.can_undo());
        assert_eq!(text(&ctl), "");
    }

    #[test]
    fn labels_follow_the_change() {
        let mut ctl = text_controller();
        ctl.apply_labeled("Type A", |s| s.state_mut().push('A'));
        ctl.checkpoint_labeled("Type B");
        assert_eq!(ctl.history().undo_labels(10), vec!["Type B", "Type A"]);

        ctl.undo().unwrap();
        ctl.undo().unwrap();
        assert_eq!(ctl.history().redo_labels(10), vec!["Type A", "Type B"]);
        assert_eq!(ctl.history().next_redo_label(), Some("Type A"));

        ctl.redo().unwrap();
        assert_eq!(ctl.history().next_undo_label(), Some("Type A"));
    }

    #[test]
    fn clear_history_keeps_live_state() {
        let mut ctl = text_controller();
        ctl.apply(|s| s.state_mut().push('A'));
        ctl.clear_history();
        assert_eq!(ctl.history_state(), HistoryState::Clean);
        assert_eq!(text(&ctl), "A");
    }

    #[test]
    fn observers_see_every_event() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut ctl = text_controller();
        ctl.subscribe(Box::new(move |event: &HistoryEvent| {
            sink.lock().unwrap().push(event.clone());
        }));

        ctl.apply_labeled("A", |s| s.state_mut().push('A'));
        ctl.undo().unwrap();
        let _ = ctl.undo();
        ctl.redo().unwrap();
        ctl.undo().unwrap();
        ctl.apply(|s| s.state_mut().push('B'));
        ctl.clear_history();

        let events = seen.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                HistoryEvent::Recorded {
                    label: Some("A".into()),
                    discarded: 0,
                    state: HistoryState::UndoOnly,
                },
                HistoryEvent::Undone {
                    label: Some("A".into()),
                    state: HistoryState::RedoOnly,
                },
                HistoryEvent::Rejected {
                    direction: Direction::Undo,
                    state: HistoryState::RedoOnly,
                },
                HistoryEvent::Redone {
                    label: Some("A".into()),
                    state: HistoryState::UndoOnly,
                },
                HistoryEvent::Undone {
                    label: Some("A".into()),
                    state: HistoryState::RedoOnly,
                },
                HistoryEvent::Recorded {
                    label: None,
                    discarded: 1,
                    state: HistoryState::UndoOnly,
                },
                HistoryEvent::Cleared,
            ]
        );
    }

    #[test]
    fn deferred_events_wait_for_take() {
        let count = Arc::new(Mutex::new(0usize));
        let sink = count.clone();
        let mut ctl = text_controller();
        ctl.subscribe(Box::new(move |_: &HistoryEvent| {
            *sink.lock().unwrap() += 1;
        }));
        ctl.defer_events();

        ctl.apply(|s| s.state_mut().push('A'));
        ctl.undo().unwrap();
        assert_eq!(*count.lock().unwrap(), 0);

        let events = ctl.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], HistoryEvent::Recorded { .. }));
        assert!(matches!(events[1], HistoryEvent::Undone { .. }));
        assert!(ctl.take_events().is_empty());
        assert_eq!(ctl.take_observers().len(), 1);
    }

    #[test]
    fn unsubscribed_observer_is_silent() {
        let count = Arc::new(Mutex::new(0usize));
        let sink = count.clone();
        let mut ctl = text_controller();
        let id = ctl.subscribe(Box::new(move |_: &HistoryEvent| {
            *sink.lock().unwrap() += 1;
        }));
        ctl.checkpoint();
        assert!(ctl.unsubscribe(id));
        ctl.checkpoint();
        assert_eq!(*count.lock().unwrap(), 1);
    }

    /// Originator whose identity can be swapped to simulate foreign snapshots.
    struct Fickle {
        value: i32,
        origin: OriginId,
    }

    impl Originator for Fickle {
        type State = i32;

        fn origin(&self) -> OriginId {
            self.origin
        }

        fn capture(&self) -> Snapshot<i32> {
            Snapshot::new(self.origin, self.value)
        }

        fn restore(&mut self, snapshot: Snapshot<i32>) -> Result<(), ForeignSnapshot<i32>> {
            if !self.owns(&snapshot) {
                return Err(ForeignSnapshot::new(self.origin, snapshot));
            }
            self.value = snapshot.into_state();
            Ok(())
        }
    }

    #[test]
    fn foreign_snapshot_leaves_everything_unchanged() {
        let first = OriginId::next();
        let mut ctl = Controller::new(
            Fickle {
                value: 1,
                origin: first,
            },
            HistoryConfig::unlimited(),
        );
        ctl.apply(|f| f.value = 2);
        ctl.apply(|f| f.value = 3);
        ctl.undo().unwrap();

        let second = OriginId::next();
        ctl.originator.origin = second;

        let err = ctl.undo().unwrap_err();
        assert_eq!(
            err,
            HistoryError::ForeignSnapshot {
                expected: second,
                found: first
            }
        );
        assert_eq!(ctl.originator().value, 2);
        assert_eq!(ctl.history().undo_depth(), 1);
        assert_eq!(ctl.history().redo_depth(), 1);
        assert_eq!(ctl.history().peek_undo().map(|s| *s.state()), Some(1));

        let err = ctl.redo().unwrap_err();
        assert!(!err.is_no_history());
        assert_eq!(ctl.originator().value, 2);
        assert_eq!(ctl.history().peek_redo().map(|s| *s.state()), Some(3));
    }
}
