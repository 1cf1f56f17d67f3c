use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{ConsoleError, ConsoleResult};

#[derive(Default)]
struct Registry {
    next: u64,
    current: HashMap<(String, String), u64>,
}

/// Generation counters for the requests each view has in flight.
///
/// A request takes a [`RequestTicket`] for a `(view, slot)` pair. Starting
/// another request in the same slot, or cancelling the view, makes the older
/// ticket stale, and its completion is then dropped instead of applied.
#[derive(Clone, Default)]
pub struct InFlight {
    registry: Arc<Mutex<Registry>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn begin(&self, view: &str, slot: &str) -> RequestTicket {
        let mut registry = self.lock();
        registry.next += 1;
        let generation = registry.next;
        registry
            .current
            .insert((view.to_string(), slot.to_string()), generation);
        RequestTicket {
            registry: self.clone(),
            view: view.to_string(),
            slot: slot.to_string(),
            generation,
        }
    }

    pub fn cancel(&self, view: &str, slot: &str) {
        self.lock()
            .current
            .remove(&(view.to_string(), slot.to_string()));
    }

    /// Cancels every outstanding request of `view`.
    pub fn cancel_view(&self, view: &str) -> usize {
        let mut registry = self.lock();
        let before = registry.current.len();
        registry.current.retain(|(owner, _), _| owner != view);
        let cancelled = before - registry.current.len();
        if cancelled > 0 {
            debug!(view, cancelled, "cancelled in-flight requests");
        }
        cancelled
    }

    /// Cancels the requests of `view` whose slot starts with `prefix`.
    pub fn cancel_prefix(&self, view: &str, prefix: &str) {
        self.lock()
            .current
            .retain(|(owner, slot), _| owner != view || !slot.starts_with(prefix));
    }

    pub fn pending(&self, view: &str) -> usize {
        self.lock()
            .current
            .keys()
            .filter(|(owner, _)| owner == view)
            .count()
    }

    fn is_current(&self, view: &str, slot: &str, generation: u64) -> bool {
        self.lock()
            .current
            .get(&(view.to_string(), slot.to_string()))
            .is_some_and(|current| *current == generation)
    }

    fn release(&self, view: &str, slot: &str, generation: u64) {
        let mut registry = self.lock();
        let key = (view.to_string(), slot.to_string());
        if registry.current.get(&key) == Some(&generation) {
            registry.current.remove(&key);
        }
    }
}

/// Handle of one in-flight request.
pub struct RequestTicket {
    registry: InFlight,
    view: String,
    slot: String,
    generation: u64,
}

impl RequestTicket {
    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn is_current(&self) -> bool {
        self.registry
            .is_current(&self.view, &self.slot, self.generation)
    }

    /// Passes `result` through while the ticket is current and retires it;
    /// a stale ticket turns any outcome into [`ConsoleError::Cancelled`].
    pub fn finish<T>(&self, result: ConsoleResult<T>) -> ConsoleResult<T> {
        if !self.is_current() {
            debug!(view = %self.view, slot = %self.slot, "discarded stale completion");
            return Err(ConsoleError::Cancelled);
        }
        self.registry
            .release(&self.view, &self.slot, self.generation);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_supersedes_older_one() {
        let inflight = InFlight::new();
        let first = inflight.begin("equipment-type", "list");
        let second = inflight.begin("equipment-type", "list");
        assert!(!first.is_current());
        assert!(matches!(first.finish(Ok(1)), Err(ConsoleError::Cancelled)));
        assert_eq!(second.finish(Ok(2)).expect("current"), 2);
        assert_eq!(inflight.pending("equipment-type"), 0);
    }

    #[test]
    fn cancel_view_only_touches_that_view() {
        let inflight = InFlight::new();
        let list = inflight.begin("client", "list");
        let refs = inflight.begin("client", "reference:projectId");
        let other = inflight.begin("project", "list");
        assert_eq!(inflight.cancel_view("client"), 2);
        assert!(!list.is_current());
        assert!(!refs.is_current());
        assert!(other.is_current());
    }

    #[test]
    fn errors_pass_through_current_tickets() {
        let inflight = InFlight::new();
        let ticket = inflight.begin("client", "save");
        let result: ConsoleResult<()> = ticket.finish(Err(ConsoleError::Transport("down".into())));
        assert!(matches!(result, Err(ConsoleError::Transport(_))));
    }

    #[test]
    fn cancel_prefix_leaves_other_slots() {
        let inflight = InFlight::new();
        let ledger = inflight.begin("equipment-stock", "ledger/list");
        let record = inflight.begin("equipment-stock", "record/list");
        inflight.cancel_prefix("equipment-stock", "ledger/");
        assert!(!ledger.is_current());
        assert!(record.is_current());
    }
}
