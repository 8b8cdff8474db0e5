//! Communications store.
//!
//! Leave requests, complaints, queries, notices and payment advances flow
//! through here. The store shares the session service's backend selection,
//! so once demo mode is active (explicitly or reactively) every operation
//! transparently works against the seeded dataset.

use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;

use kaziflow_backend::{Communication, CommunicationStatus, NewCommunication};
use kaziflow_core::CommunicationId;

use crate::error::SessionError;
use crate::fallback::DemoEntry;
use crate::service::SessionService;
use crate::state::{read_lock, write_lock};

/// Backend call with reactive demo fallback, recording failures into the
/// communications state.
macro_rules! or_demo_comms {
    ($self:expr, $backend:ident, $call:expr) => {
        match $call {
            Ok(value) => value,
            Err(err) if err.is_environmental() => {
                $backend = $self.session.switch_to_demo(DemoEntry::Reactive);
                match $call {
                    Ok(value) => value,
                    Err(err) => return Err($self.record(SessionError::from_backend(err))),
                }
            }
            Err(err) => return Err($self.record(SessionError::from_backend(err))),
        }
    };
}

/// Observable state of the communications store.
#[derive(Debug, Clone, Default)]
pub struct CommunicationsState {
    pub items: Vec<Communication>,
    pub is_loading: bool,
    pub last_error: Option<SessionError>,
}

/// Store for the current actor's communications.
pub struct CommunicationsService {
    session: Arc<SessionService>,
    state: RwLock<CommunicationsState>,
    op_lock: Mutex<()>,
}

/// RAII guard mirroring the session store's loading discipline.
struct CommsLoadingGuard<'a> {
    state: &'a RwLock<CommunicationsState>,
}

impl<'a> CommsLoadingGuard<'a> {
    fn begin(state: &'a RwLock<CommunicationsState>) -> Self {
        {
            let mut s = write_lock(state);
            s.is_loading = true;
            s.last_error = None;
        }
        Self { state }
    }
}

impl Drop for CommsLoadingGuard<'_> {
    fn drop(&mut self) {
        write_lock(self.state).is_loading = false;
    }
}

impl CommunicationsService {
    pub fn new(session: Arc<SessionService>) -> Self {
        Self {
            session,
            state: RwLock::new(CommunicationsState::default()),
            op_lock: Mutex::new(()),
        }
    }

    /// Snapshot of the store's state.
    pub fn state(&self) -> CommunicationsState {
        read_lock(&self.state).clone()
    }

    fn record(&self, err: SessionError) -> SessionError {
        write_lock(&self.state).last_error = Some(err.clone());
        err
    }

    /// Fetch communications visible to the current session, newest first.
    pub async fn fetch(&self) -> Result<Vec<Communication>, SessionError> {
        let _op = self.op_lock.lock().await;
        let _loading = CommsLoadingGuard::begin(&self.state);
        let mut backend = self.session.active_backend();

        let items = or_demo_comms!(self, backend, backend.list_communications().await);

        write_lock(&self.state).items = items.clone();
        Ok(items)
    }

    /// Create a communication; it is stored with `pending` status and the
    /// local list is refreshed from the backend afterwards.
    pub async fn create(&self, new: NewCommunication) -> Result<Communication, SessionError> {
        let _op = self.op_lock.lock().await;
        let _loading = CommsLoadingGuard::begin(&self.state);
        let mut backend = self.session.active_backend();

        let created = or_demo_comms!(self, backend, backend.insert_communication(&new).await);
        tracing::debug!(id = %created.id, "communication created");

        let items = or_demo_comms!(self, backend, backend.list_communications().await);
        write_lock(&self.state).items = items;
        Ok(created)
    }

    /// Transition a communication's status (managers and HR admins only).
    pub async fn update_status(
        &self,
        id: CommunicationId,
        status: CommunicationStatus,
    ) -> Result<Communication, SessionError> {
        {
            let session_state = self.session.state();
            let Some(actor) = session_state.actor else {
                return Err(self.record(SessionError::NotAuthenticated));
            };
            if !actor.role.can_review_communications() {
                return Err(self.record(SessionError::Forbidden(
                    "only managers and HR admins may update communication status".to_string(),
                )));
            }
        }

        let _op = self.op_lock.lock().await;
        let _loading = CommsLoadingGuard::begin(&self.state);
        let mut backend = self.session.active_backend();

        let updated = or_demo_comms!(
            self,
            backend,
            backend.update_communication_status(id, status).await
        );

        let items = or_demo_comms!(self, backend, backend.list_communications().await);
        write_lock(&self.state).items = items;
        Ok(updated)
    }
}
