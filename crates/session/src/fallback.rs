//! Demo-mode fallback controller.
//!
//! Two ways in: the durable flag was set before `initialize` ran (the user
//! chose the demo), or a backend call failed with an environmental error and
//! the switch happens silently mid-operation. Either way the active backend
//! is swapped for a freshly seeded [`DemoBackend`] exactly once; calling code
//! keeps using the same `Backend` interface and never branches on mode.

use std::sync::Arc;

use kaziflow_backend::demo::{self, DemoBackend};
use kaziflow_backend::{Backend, DEMO_MODE_FLAG};

use crate::service::SessionService;
use crate::state::write_lock;

/// How demo mode was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DemoEntry {
    /// The user asked for the demo (durable flag).
    Explicit,
    /// An environmental backend failure forced the switch.
    Reactive,
}

impl SessionService {
    /// Activate demo mode and return the backend to continue with.
    ///
    /// Idempotent: if demo mode is already active the current backend is
    /// returned untouched, so a burst of failing calls switches only once.
    /// The dataset is reseeded on every fresh entry.
    pub(crate) fn switch_to_demo(&self, entry: DemoEntry) -> Arc<dyn Backend> {
        {
            let state = self.state_cell();
            if crate::state::read_lock(state).demo_mode {
                return self.active_backend();
            }
        }

        match entry {
            DemoEntry::Explicit => tracing::info!("entering demo mode"),
            DemoEntry::Reactive => {
                tracing::warn!("backend unusable, degrading to demo mode");
            }
        }

        let backend: Arc<dyn Backend> = Arc::new(DemoBackend::seeded());
        self.set_active_backend(backend.clone());

        let mut state = write_lock(self.state_cell());
        state.demo_mode = true;
        state.actor = Some(demo::demo_actor());
        state.last_error = None;
        backend
    }

    /// Explicitly opt into demo mode ("try the demo").
    ///
    /// Persists the durable flag so the choice survives reloads, then
    /// activates immediately.
    pub fn enable_demo_mode(&self) {
        self.flag_store().set(DEMO_MODE_FLAG, true);
        self.switch_to_demo(DemoEntry::Explicit);
    }
}
