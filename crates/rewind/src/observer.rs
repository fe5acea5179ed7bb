#![forbid(unsafe_code)]

//! History change notifications.
//!
//! Observers are explicit collaborators handed to a
//! [`Controller`](crate::Controller). Use them to keep "Undo"/"Redo"
//! affordances in sync, especially after a `record` silently discards the
//! redo branch.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Direction;
use crate::history::HistoryState;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`Controller::subscribe`](crate::Controller::subscribe).
///
/// Unique within the process, so an observer keeps its id when it moves
/// from a [`Controller`](crate::Controller) into a
/// [`SharedController`](crate::SharedController).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Something that happened to a controller's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    /// A pre-mutation snapshot was recorded.
    Recorded {
        label: Option<String>,
        /// Redo snapshots discarded by this record.
        discarded: usize,
        state: HistoryState,
    },
    /// A snapshot was restored from the undo stack.
    Undone {
        label: Option<String>,
        state: HistoryState,
    },
    /// A snapshot was restored from the redo stack.
    Redone {
        label: Option<String>,
        state: HistoryState,
    },
    /// An undo or redo was refused; nothing changed.
    Rejected {
        direction: Direction,
        state: HistoryState,
    },
    /// Both stacks were emptied.
    Cleared,
}

impl HistoryEvent {
    /// Availability after the event.
    #[must_use]
    pub fn state(&self) -> HistoryState {
        match self {
            Self::Recorded { state, .. }
            | Self::Undone { state, .. }
            | Self::Redone { state, .. }
            | Self::Rejected { state, .. } => *state,
            Self::Cleared => HistoryState::Clean,
        }
    }
}

/// Receives [`HistoryEvent`]s.
pub trait HistoryObserver: Send {
    fn on_event(&mut self, event: &HistoryEvent);
}

impl<F> HistoryObserver for F
where
    F: FnMut(&HistoryEvent) + Send,
{
    fn on_event(&mut self, event: &HistoryEvent) {
        self(event);
    }
}

/// Subscriber list owned by a controller.
#[derive(Default)]
pub(crate) struct Observers {
    entries: Vec<(ObserverId, Box<dyn HistoryObserver>)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn HistoryObserver>) -> ObserverId {
        let id = ObserverId::next();
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = ObserverId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Move every entry of `other` to the end of this list.
    pub(crate) fn absorb(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(ObserverId) -> bool) {
        self.entries.retain(|(id, _)| keep(*id));
    }

    pub(crate) fn notify(&mut self, event: &HistoryEvent) {
        for (_, observer) in &mut self.entries {
            observer.on_event(event);
        }
    }
}
