#![forbid(unsafe_code)]

//! Observer that keeps every history event.

use std::sync::{Arc, Mutex};

use rewind::{HistoryEvent, HistoryObserver};

/// Cloneable event log. Subscribe one clone, inspect another.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<HistoryEvent>>>,
}

impl EventRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A boxed clone ready for `Controller::subscribe`.
    #[must_use]
    pub fn boxed(&self) -> Box<dyn HistoryObserver> {
        Box::new(self.clone())
    }

    #[must_use]
    pub fn events(&self) -> Vec<HistoryEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<HistoryEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryObserver for EventRecorder {
    fn on_event(&mut self, event: &HistoryEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
