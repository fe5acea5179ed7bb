#![forbid(unsafe_code)]

//! Thread-safe controller handle.
//!
//! The two history stacks form one shared resource. `undo` and `redo` are a
//! pop-then-push pair, so every operation takes the same lock for its whole
//! duration; a concurrent `record` can never observe a torn stack.
//!
//! # Observer Delivery
//!
//! Events are queued while the controller lock is held and delivered after
//! it is released, in operation order. An observer may therefore query or
//! drive the same [`SharedController`] from inside its callback. Events
//! raised during delivery, by a callback or by another thread, join the
//! queue and are handed out by the thread already delivering.
//!
//! # Poisoning
//!
//! Lock poisoning is recovered rather than propagated. Each history
//! operation either fully applies or leaves the stacks unchanged, so the
//! stacks stay consistent even if a caller's mutation closure panicked. The
//! originator itself may be left half-mutated by such a closure, but its
//! pre-state was recorded first, so `undo()` returns to it.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::HistoryConfig;
use crate::controller::Controller;
use crate::error::HistoryError;
use crate::history::HistoryState;
use crate::observer::{HistoryEvent, HistoryObserver, ObserverId, Observers};
use crate::originator::Originator;

/// Cloneable handle to a [`Controller`] shared across threads.
pub struct SharedController<O: Originator> {
    inner: Arc<Mutex<Controller<O>>>,
    delivery: Arc<Mutex<Delivery>>,
}

/// Observers and the events waiting for them.
#[derive(Default)]
struct Delivery {
    observers: Observers,
    queue: VecDeque<HistoryEvent>,
    /// Currently subscribed ids, including observers lent to a delivering
    /// thread.
    live: HashSet<ObserverId>,
    delivering: bool,
}

fn lock_delivery(delivery: &Mutex<Delivery>) -> MutexGuard<'_, Delivery> {
    delivery.lock().unwrap_or_else(|e| e.into_inner())
}

/// Observers lent out of [`Delivery`] for the length of one delivery run.
///
/// Returns them on drop, so a panicking observer does not stall delivery
/// for good.
struct InFlight<'a> {
    delivery: &'a Mutex<Delivery>,
    observers: Observers,
    returned: bool,
}

impl InFlight<'_> {
    fn give_back(&mut self, slot: &mut Delivery) {
        let mut observers = std::mem::take(&mut self.observers);
        observers.absorb(std::mem::take(&mut slot.observers));
        observers.retain(|id| slot.live.contains(&id));
        slot.observers = observers;
        slot.delivering = false;
        self.returned = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.returned {
            let delivery = self.delivery;
            self.give_back(&mut lock_delivery(delivery));
        }
    }
}

impl<O: Originator> Clone for SharedController<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            delivery: Arc::clone(&self.delivery),
        }
    }
}

impl<O: Originator> fmt::Debug for SharedController<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observers = lock_delivery(&self.delivery).live.len();
        let guard = self.lock();
        f.debug_struct("SharedController")
            .field("state", &guard.history_state())
            .field("undo_depth", &guard.history().undo_depth())
            .field("redo_depth", &guard.history().redo_depth())
            .field("observers", &observers)
            .finish()
    }
}

impl<O: Originator> From<Controller<O>> for SharedController<O> {
    /// Observers already subscribed on `controller` keep their ids.
    fn from(mut controller: Controller<O>) -> Self {
        controller.defer_events();
        let observers = controller.take_observers();
        let delivery = Delivery {
            live: observers.ids().collect(),
            observers,
            ..Delivery::default()
        };
        Self {
            inner: Arc::new(Mutex::new(controller)),
            delivery: Arc::new(Mutex::new(delivery)),
        }
    }
}

impl<O: Originator> SharedController<O> {
    #[must_use]
    pub fn new(originator: O, config: HistoryConfig) -> Self {
        Controller::new(originator, config).into()
    }

    fn lock(&self) -> MutexGuard<'_, Controller<O>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `op` under the controller lock, queue what it raised, then
    /// deliver with the lock released.
    fn run<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&mut Controller<O>) -> R,
    {
        let result = {
            let mut controller = self.lock();
            let result = op(&mut controller);
            let events = controller.take_events();
            let adopted = controller.take_observers();
            let mut slot = lock_delivery(&self.delivery);
            slot.live.extend(adopted.ids());
            slot.observers.absorb(adopted);
            slot.queue.extend(events);
            result
        };
        self.deliver();
        result
    }

    fn deliver(&self) {
        let mut in_flight = {
            let mut slot = lock_delivery(&self.delivery);
            if slot.delivering || slot.queue.is_empty() {
                return;
            }
            slot.delivering = true;
            InFlight {
                delivery: &self.delivery,
                observers: std::mem::take(&mut slot.observers),
                returned: false,
            }
        };

        loop {
            let event = {
                let mut slot = lock_delivery(&self.delivery);
                let next = slot.queue.pop_front();
                match next {
                    Some(event) => {
                        in_flight.observers.retain(|id| slot.live.contains(&id));
                        event
                    }
                    None => {
                        in_flight.give_back(&mut slot);
                        return;
                    }
                }
            };
            in_flight.observers.notify(&event);
        }
    }

    /// Record the pre-mutation state and mutate, as one critical section.
    pub fn apply<F, R>(&self, mutate: F) -> R
    where
        F: FnOnce(&mut O) -> R,
    {
        self.run(|c| c.apply(mutate))
    }

    pub fn apply_labeled<F, R>(&self, label: impl Into<String>, mutate: F) -> R
    where
        F: FnOnce(&mut O) -> R,
    {
        self.run(|c| c.apply_labeled(label, mutate))
    }

    pub fn checkpoint(&self) {
        self.run(Controller::checkpoint);
    }

    pub fn undo(&self) -> Result<HistoryState, HistoryError> {
        self.run(Controller::undo)
    }

    pub fn redo(&self) -> Result<HistoryState, HistoryError> {
        self.run(Controller::redo)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.lock().can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.lock().can_redo()
    }

    #[must_use]
    pub fn history_state(&self) -> HistoryState {
        self.lock().history_state()
    }

    pub fn clear_history(&self) {
        self.run(Controller::clear_history);
    }

    /// Register an observer. Safe to call from inside another observer; the
    /// newcomer sees events raised after the current delivery run.
    pub fn subscribe(&self, observer: Box<dyn HistoryObserver>) -> ObserverId {
        let mut slot = lock_delivery(&self.delivery);
        let id = slot.observers.subscribe(observer);
        slot.live.insert(id);
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut slot = lock_delivery(&self.delivery);
        slot.observers.unsubscribe(id);
        slot.live.remove(&id)
    }

    /// Run `f` with exclusive access to the whole controller.
    ///
    /// Use this to read the originator or to group several operations into
    /// one critical section. Events are delivered once `f` returns, and
    /// observers subscribed through the controller move to this handle.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Controller<O>) -> R,
    {
        self.run(f)
    }
}
