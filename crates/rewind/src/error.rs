#![forbid(unsafe_code)]

//! Error types for history traversal and restore.
//!
//! # Failure Modes
//!
//! - **Empty stack**: `undo`/`redo` with nothing to step to.
//!   Recoverable; nothing changes and the caller can disable the affordance.
//! - **Foreign snapshot**: a snapshot restored into an originator that did not
//!   produce it. A programming error; it is rejected, never applied.

use std::fmt;

use thiserror::Error;

use crate::snapshot::{OriginId, Snapshot};

/// Which way through history an operation was heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward older states.
    Undo,
    /// Toward newer states.
    Redo,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Undo => Self::Redo,
            Self::Redo => Self::Undo,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        })
    }
}

/// The requested stack was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("nothing to {direction}")]
pub struct NoHistory {
    pub direction: Direction,
}

/// A snapshot was handed to an originator that did not produce it.
///
/// The rejected snapshot travels back inside the error so that no history
/// is lost.
#[derive(Error)]
#[error("snapshot from {found} cannot be restored into {expected}")]
pub struct ForeignSnapshot<S> {
    pub expected: OriginId,
    pub found: OriginId,
    snapshot: Snapshot<S>,
}

impl<S> ForeignSnapshot<S> {
    #[must_use]
    pub fn new(expected: OriginId, snapshot: Snapshot<S>) -> Self {
        Self {
            expected,
            found: snapshot.origin(),
            snapshot,
        }
    }

    /// Take back the rejected snapshot.
    #[must_use]
    pub fn into_snapshot(self) -> Snapshot<S> {
        self.snapshot
    }
}

impl<S> fmt::Debug for ForeignSnapshot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignSnapshot")
            .field("expected", &self.expected)
            .field("found", &self.found)
            .finish_non_exhaustive()
    }
}

/// Errors surfaced by [`Controller`](crate::Controller) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("nothing to {direction}")]
    NoHistory { direction: Direction },
    #[error("snapshot from {found} cannot be restored into {expected}")]
    ForeignSnapshot { expected: OriginId, found: OriginId },
}

impl HistoryError {
    /// Whether this is the recoverable empty-stack case.
    #[must_use]
    pub fn is_no_history(&self) -> bool {
        matches!(self, Self::NoHistory { .. })
    }
}

impl From<NoHistory> for HistoryError {
    fn from(err: NoHistory) -> Self {
        Self::NoHistory {
            direction: err.direction,
        }
    }
}

impl<S> From<ForeignSnapshot<S>> for HistoryError {
    fn from(err: ForeignSnapshot<S>) -> Self {
        Self::ForeignSnapshot {
            expected: err.expected,
            found: err.found,
        }
    }
}
