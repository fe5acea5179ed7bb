#![forbid(unsafe_code)]

//! Immutable state captures.
//!
//! A [`Snapshot`] is moved, never shared: it lives either in an
//! [`Originator`](crate::Originator) restore call or in exactly one slot of
//! one [`History`](crate::History) stack. It deliberately does not implement
//! `Clone`.
//!
//! Equality and hashing look at the captured state only. The [`OriginId`]
//! and the label are metadata and do not take part in comparisons.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of the originator that produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OriginId(u64);

impl OriginId {
    /// Allocate a fresh identifier. Never returns the same value twice.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "origin#{}", self.0)
    }
}

/// A point-in-time capture of an originator's state.
pub struct Snapshot<S> {
    state: S,
    origin: OriginId,
    label: Option<String>,
}

impl<S> Snapshot<S> {
    /// Wrap a captured state produced by the originator `origin`.
    ///
    /// `state` must not alias any buffer the originator keeps mutating.
    #[must_use]
    pub fn new(origin: OriginId, state: S) -> Self {
        Self {
            state,
            origin,
            label: None,
        }
    }

    /// Attach a description of the change that followed this capture.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Replace the label, returning the snapshot.
    #[must_use]
    pub(crate) fn relabel(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// The captured state.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Consume the snapshot, yielding the captured state.
    #[must_use]
    pub fn into_state(self) -> S {
        self.state
    }

    /// Identifier of the originator that produced this snapshot.
    #[must_use]
    pub fn origin(&self) -> OriginId {
        self.origin
    }

    /// Human-readable description of the change, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<S: fmt::Debug> fmt::Debug for Snapshot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("origin", &self.origin)
            .field("label", &self.label)
            .field("state", &self.state)
            .finish()
    }
}

impl<S: PartialEq> PartialEq for Snapshot<S> {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl<S: Eq> Eq for Snapshot<S> {}

impl<S: Hash> Hash for Snapshot<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.state.hash(state);
    }
}
