//! # engine::listeners
//!
//! Observer registry for [`SimEvent`]s.
//!
//! Emission is synchronous fan-out in registration order.  A listener that
//! returns `Err` or panics is logged and skipped; the rest still get the event
//! and the simulator carries on.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{error, warn};

use crate::events::{EventKind, SimEvent};

pub type Listener = Box<dyn FnMut(&SimEvent) -> anyhow::Result<()> + Send>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Registration {
    id:       ListenerId,
    /// `None` = every event.
    filter:   Option<EventKind>,
    listener: Listener,
}

#[derive(Default)]
pub struct EventBus {
    registrations: Vec<Registration>,
    next_id:       u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, filter: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration { id, filter, listener });
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Delivers `event` to every matching listener.  Returns how many
    /// listeners failed.
    pub fn emit(&mut self, event: &SimEvent) -> usize {
        let kind = event.kind();
        let mut failures = 0;

        for reg in self.registrations.iter_mut() {
            if reg.filter.is_some_and(|f| f != kind) {
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| (reg.listener)(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    failures += 1;
                    warn!(listener = ?reg.id, event = ?kind, error = %err, "Listener returned an error");
                }
                Err(_) => {
                    failures += 1;
                    error!(listener = ?reg.id, event = ?kind, "Listener panicked — event delivery continues");
                }
            }
        }

        failures
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.registrations.len())
            .finish()
    }
}
