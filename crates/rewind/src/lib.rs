#![forbid(unsafe_code)]

//! Snapshot-based undo/redo history engine.
//!
//! `rewind` lets any mutable subject (an [`Originator`]) record point-in-time
//! [`Snapshot`]s of its state and walk backward and forward through them.
//!
//! # Architecture
//!
//! ```text
//!            capture()                   record()
//!  ┌────────────┐ ──────► Snapshot ──────► ┌──────────────────────────┐
//!  │ Originator │                          │         History          │
//!  │ (live      │                          │  Undo: [s0, s1, s2]      │
//!  │  state)    │ ◄────── Snapshot ◄────── │  Redo: []                │
//!  └────────────┘ restore()      undo()    └──────────────────────────┘
//!         ▲                                            ▲
//!         └───────────────── Controller ───────────────┘
//! ```
//!
//! - [`Snapshot`]: immutable, move-only state capture.
//! - [`Originator`]: owns the live state; produces and accepts snapshots.
//! - [`History`]: the undo/redo stack pair and its protocol. It never talks
//!   to the originator.
//! - [`Controller`]: sequences capture, record, and restore so that `undo()`
//!   always returns the state before the most recent change.
//!
//! # Quick Start
//!
//! ```
//! use rewind::{Controller, HistoryConfig, Subject};
//!
//! let mut editor = Controller::new(Subject::new(String::new()), HistoryConfig::default());
//!
//! editor.apply(|doc| doc.state_mut().push('A'));
//! editor.apply(|doc| doc.state_mut().push('B'));
//! assert_eq!(editor.originator().state(), "AB");
//!
//! editor.undo().unwrap();
//! assert_eq!(editor.originator().state(), "A");
//!
//! editor.redo().unwrap();
//! assert_eq!(editor.originator().state(), "AB");
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod observer;
pub mod originator;
pub mod shared;
pub mod snapshot;

pub use config::HistoryConfig;
#[cfg(feature = "config")]
pub use config::ConfigError;
pub use controller::Controller;
pub use error::{Direction, ForeignSnapshot, HistoryError, NoHistory};
pub use history::{History, HistoryState};
pub use observer::{HistoryEvent, HistoryObserver, ObserverId};
pub use originator::{Originator, Subject};
pub use shared::SharedController;
pub use snapshot::{OriginId, Snapshot};

/// Persistent collection types for snapshot-friendly state.
///
/// Re-exports types from the [`im`] crate. Cloning these collections is
/// O(1) and later mutations share structure, so capturing a
/// large [`Subject`] stays cheap.
///
/// ```ignore
/// use rewind::{persistent, Controller, HistoryConfig, Subject};
///
/// let mut map = persistent::HashMap::new();
/// map.insert("key", 42);
/// let mut ctl = Controller::new(Subject::new(map), HistoryConfig::default());
/// ctl.apply(|s| s.state_mut().insert("key2", 99));
/// ```
#[cfg(feature = "hamt")]
pub mod persistent {
    pub use im::{HashMap, HashSet, OrdMap, OrdSet, Vector};
}
