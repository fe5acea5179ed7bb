#![forbid(unsafe_code)]

//! Test harness and reference fixtures for `rewind`.
//!
//! - [`capture`]: a `tracing` layer that records spans and events so tests can
//!   assert on structured log output.
//! - [`document`]: a small text document implementing
//!   [`Originator`](rewind::Originator) by hand, with a cursor and a
//!   revision counter.
//! - [`recorder`]: a [`HistoryObserver`](rewind::HistoryObserver) that keeps
//!   every event for later inspection.

pub mod capture;
pub mod document;
pub mod recorder;

pub use capture::{CaptureHandle, CapturedEvent, CapturedSpan, with_captured_tracing};
pub use document::{DocState, TextDocument};
pub use recorder::EventRecorder;
