//! The session store.
//!
//! `SessionService` is an explicit, injectable service object: construct it
//! once with a backend and a flag store, share it by `Arc`, and read state
//! snapshots from anywhere. Mutating operations are serialized by a mutex so
//! at most one is in flight; overlapping callers queue in invocation order.

use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;

use kaziflow_backend::{Backend, DEMO_MODE_FLAG, FlagStore, ProfileChanges};
use kaziflow_core::{ActorId, DialCode, EmailAddress, PhoneNumber, Pin};

use crate::error::SessionError;
use crate::fallback::DemoEntry;
use crate::state::{LoadingGuard, SessionState, read_lock, write_lock};

/// Result of a phone-number lookup during onboarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneLookup {
    pub actor_id: ActorId,
    pub full_name: String,
    pub pin_set: bool,
}

/// The authoritative holder of session state.
pub struct SessionService {
    /// The backend chosen at construction; restored after leaving demo mode.
    real: Arc<dyn Backend>,
    /// The backend all operations currently route through.
    active: RwLock<Arc<dyn Backend>>,
    state: RwLock<SessionState>,
    flags: Arc<dyn FlagStore>,
    /// Serializes mutating operations (held across suspension points).
    op_lock: Mutex<()>,
}

/// Run a backend call; on an environmental failure, switch to demo mode and
/// run it once more against the demo backend. Any other failure is recorded
/// and rethrown through `$map_err`.
macro_rules! or_demo {
    ($self:expr, $backend:ident, $call:expr, $map_err:expr) => {
        match $call {
            Ok(value) => value,
            Err(err) if err.is_environmental() => {
                $backend = $self.switch_to_demo(DemoEntry::Reactive);
                match $call {
                    Ok(value) => value,
                    Err(err) => return Err($self.record($map_err(err))),
                }
            }
            Err(err) => return Err($self.record($map_err(err))),
        }
    };
}

pub(crate) use or_demo;

impl SessionService {
    pub fn new(backend: Arc<dyn Backend>, flags: Arc<dyn FlagStore>) -> Self {
        Self {
            real: backend.clone(),
            active: RwLock::new(backend),
            state: RwLock::new(SessionState::default()),
            flags,
            op_lock: Mutex::new(()),
        }
    }

    /// Snapshot of the current session state.
    pub fn state(&self) -> SessionState {
        read_lock(&self.state).clone()
    }

    pub(crate) fn active_backend(&self) -> Arc<dyn Backend> {
        read_lock(&self.active).clone()
    }

    pub(crate) async fn op_guard(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.op_lock.lock().await
    }

    pub(crate) fn state_cell(&self) -> &RwLock<SessionState> {
        &self.state
    }

    pub(crate) fn set_active_backend(&self, backend: Arc<dyn Backend>) {
        *write_lock(&self.active) = backend;
    }

    pub(crate) fn flag_store(&self) -> &dyn FlagStore {
        self.flags.as_ref()
    }

    /// Record a failure for passive observers and hand it back for the
    /// caller (record-and-rethrow contract).
    pub(crate) fn record(&self, err: SessionError) -> SessionError {
        write_lock(&self.state).last_error = Some(err.clone());
        err
    }

    /// Establish session state at application start.
    ///
    /// Reads the durable demo flag exactly once: if set, the seeded demo
    /// session is installed without any backend call. Otherwise the current
    /// actor is resolved from whatever session the backend still holds.
    /// Never fails; `is_loading` is false on return.
    pub async fn initialize(&self) {
        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::begin(&self.state);

        if self.flags.get(DEMO_MODE_FLAG) {
            tracing::info!("durable demo flag set, initializing in demo mode");
            self.switch_to_demo(DemoEntry::Explicit);
            return;
        }

        match self.active_backend().current_actor().await {
            Ok(actor) => {
                let mut state = write_lock(&self.state);
                state.actor = actor;
            }
            Err(err) if err.is_environmental() => {
                self.switch_to_demo(DemoEntry::Reactive);
            }
            Err(err) => {
                self.record(SessionError::from_backend(err));
            }
        }
    }

    /// Password sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let email = EmailAddress::parse(email)?;

        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::begin(&self.state);
        let mut backend = self.active_backend();

        let identity = or_demo!(
            self,
            backend,
            backend.sign_in_with_password(email.as_str(), password).await,
            SessionError::from_backend
        );
        tracing::debug!(actor_id = %identity.id, "signed in with password");

        let actor = or_demo!(
            self,
            backend,
            backend.current_actor().await,
            SessionError::from_backend
        );
        let Some(actor) = actor else {
            return Err(self.record(SessionError::ProfileNotFound));
        };

        write_lock(&self.state).actor = Some(actor);
        Ok(())
    }

    /// Phone + PIN sign-in.
    ///
    /// Establishes a session by piggybacking on password issuance with the
    /// tenant's synthesized login identifier once the PIN has verified
    /// locally against the stored hash.
    pub async fn sign_in_with_pin(
        &self,
        dial: &DialCode,
        number: &str,
        pin: &str,
    ) -> Result<(), SessionError> {
        let phone = PhoneNumber::normalize(dial, number)?;

        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::begin(&self.state);
        let mut backend = self.active_backend();

        let profile = or_demo!(
            self,
            backend,
            backend.find_profile_by_phone(&phone).await,
            SessionError::from_backend
        );
        let Some(profile) = profile else {
            return Err(self.record(SessionError::ProfileNotFound));
        };

        let credential = or_demo!(
            self,
            backend,
            backend.pin_credential(profile.id).await,
            SessionError::from_backend
        );
        let Some(credential) = credential else {
            return Err(self.record(SessionError::PinNotSet));
        };
        if !credential.pin_set {
            return Err(self.record(SessionError::PinNotSet));
        }

        // Format and equality are both "invalid PIN" to the caller; only the
        // missing-credential case gets the distinguished error above.
        let Ok(pin) = Pin::parse(pin) else {
            return Err(self.record(SessionError::InvalidPin));
        };
        if !kaziflow_auth::verify_pin(&pin, &credential.pin_hash) {
            return Err(self.record(SessionError::InvalidPin));
        }

        let login = profile.tenant.pin_login_identifier(&phone);
        let _identity = or_demo!(
            self,
            backend,
            backend.sign_in_with_password(&login, pin.as_str()).await,
            SessionError::from_backend
        );
        tracing::debug!(actor_id = %profile.id, "signed in with PIN");

        write_lock(&self.state).actor = Some(profile);
        Ok(())
    }

    /// Establish (or replace) the PIN credential for a phone number.
    pub async fn setup_pin(
        &self,
        dial: &DialCode,
        number: &str,
        pin: &str,
    ) -> Result<(), SessionError> {
        let phone = PhoneNumber::normalize(dial, number)?;
        let pin = Pin::parse(pin)?;

        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::begin(&self.state);
        let mut backend = self.active_backend();

        let profile = or_demo!(
            self,
            backend,
            backend.find_profile_by_phone(&phone).await,
            SessionError::from_backend
        );
        let Some(profile) = profile else {
            return Err(self.record(SessionError::ProfileNotFound));
        };

        let pin_hash = kaziflow_auth::hash_pin(&pin)
            .map_err(|e| self.record(SessionError::Backend(e.to_string())))?;

        or_demo!(
            self,
            backend,
            backend.upsert_pin(profile.id, &pin_hash).await,
            SessionError::from_backend
        );
        tracing::debug!(actor_id = %profile.id, "PIN credential established");
        Ok(())
    }

    /// Resolve whether a phone number is registered and whether its PIN is
    /// established. Used by onboarding flows to route between "enter PIN"
    /// and "complete setup".
    pub async fn lookup_phone(
        &self,
        dial: &DialCode,
        number: &str,
    ) -> Result<PhoneLookup, SessionError> {
        let phone = PhoneNumber::normalize(dial, number)?;

        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::begin(&self.state);
        let mut backend = self.active_backend();

        let profile = or_demo!(
            self,
            backend,
            backend.find_profile_by_phone(&phone).await,
            SessionError::from_backend
        );
        let Some(profile) = profile else {
            return Err(self.record(SessionError::ProfileNotFound));
        };

        let credential = or_demo!(
            self,
            backend,
            backend.pin_credential(profile.id).await,
            SessionError::from_backend
        );

        Ok(PhoneLookup {
            actor_id: profile.id,
            full_name: profile.full_name,
            pin_set: credential.is_some_and(|c| c.pin_set),
        })
    }

    /// Write a partial profile update, then re-resolve the actor.
    ///
    /// The replacement is always a full reload, never an in-place patch, so
    /// state stays consistent with server-computed fields.
    pub async fn update_profile(&self, changes: ProfileChanges) -> Result<(), SessionError> {
        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::begin(&self.state);

        let current = read_lock(&self.state).actor.clone();
        let Some(actor) = current else {
            return Err(self.record(SessionError::NotAuthenticated));
        };
        let mut backend = self.active_backend();

        or_demo!(
            self,
            backend,
            backend.update_profile(actor.id, &changes).await,
            SessionError::from_backend
        );

        let refreshed = or_demo!(
            self,
            backend,
            backend.current_actor().await,
            SessionError::from_backend
        );
        let Some(refreshed) = refreshed else {
            return Err(self.record(SessionError::ProfileNotFound));
        };

        write_lock(&self.state).actor = Some(refreshed);
        Ok(())
    }

    /// End the session.
    ///
    /// In demo mode this clears the durable flag and resets state with no
    /// backend call; otherwise the backend session is revoked. Idempotent:
    /// signing out while signed out succeeds.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let _op = self.op_lock.lock().await;
        let _loading = LoadingGuard::begin(&self.state);

        if read_lock(&self.state).demo_mode {
            self.flags.clear(DEMO_MODE_FLAG);
            self.set_active_backend(self.real.clone());
            let mut state = write_lock(&self.state);
            state.actor = None;
            state.demo_mode = false;
            tracing::info!("left demo mode");
            return Ok(());
        }

        if let Err(err) = self.active_backend().sign_out().await {
            return Err(self.record(SessionError::from_backend(err)));
        }
        write_lock(&self.state).actor = None;
        Ok(())
    }
}
