#![forbid(unsafe_code)]

//! The snapshot/restore contract and a ready-made implementation.
//!
//! # Invariants
//!
//! - `capture()` has no side effects and returns a value independent of any
//!   later mutation.
//! - After `restore(s)` succeeds, the observable state equals the state at
//!   the time `s` was captured.
//! - `restore` succeeds for every snapshot this originator produced and
//!   rejects every other one with [`ForeignSnapshot`].

use std::fmt;

use crate::error::ForeignSnapshot;
use crate::snapshot::{OriginId, Snapshot};

/// A mutable subject whose state can be captured and restored.
pub trait Originator {
    /// The captured state type.
    type State;

    /// Identity stamped on every snapshot this originator produces.
    fn origin(&self) -> OriginId;

    /// Capture the current state.
    fn capture(&self) -> Snapshot<Self::State>;

    /// Overwrite the current state with `snapshot`.
    ///
    /// Returns the snapshot back inside the error when it was produced by a
    /// different originator.
    fn restore(&mut self, snapshot: Snapshot<Self::State>)
    -> Result<(), ForeignSnapshot<Self::State>>;

    /// Whether `snapshot` was produced by this originator.
    fn owns(&self, snapshot: &Snapshot<Self::State>) -> bool {
        snapshot.origin() == self.origin()
    }
}

/// An originator holding a single live value.
///
/// Captures clone the value; restores overwrite it. Use persistent
/// collections (see the `hamt` feature) when `S` is large.
pub struct Subject<S> {
    state: S,
    origin: OriginId,
}

impl<S> Subject<S> {
    /// Create a subject with a fresh identity.
    #[must_use]
    pub fn new(state: S) -> Self {
        Self {
            state,
            origin: OriginId::next(),
        }
    }

    /// The live state.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access to the live state.
    ///
    /// Mutations made here are not recorded; go through
    /// [`Controller::apply`](crate::Controller::apply) for undoable changes.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Replace the live state, returning the previous value.
    pub fn replace(&mut self, state: S) -> S {
        std::mem::replace(&mut self.state, state)
    }

    /// Consume the subject, yielding the live state.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.state
    }
}

impl<S: Default> Default for Subject<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: fmt::Debug> fmt::Debug for Subject<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("origin", &self.origin)
            .field("state", &self.state)
            .finish()
    }
}

impl<S: Clone> Originator for Subject<S> {
    type State = S;

    fn origin(&self) -> OriginId {
        self.origin
    }

    fn capture(&self) -> Snapshot<S> {
        Snapshot::new(self.origin, self.state.clone())
    }

    fn restore(&mut self, snapshot: Snapshot<S>) -> Result<(), ForeignSnapshot<S>> {
        if !self.owns(&snapshot) {
            return Err(ForeignSnapshot::new(self.origin, snapshot));
        }
        self.state = snapshot.into_state();
        Ok(())
    }
}
