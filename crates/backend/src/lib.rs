//! `kaziflow-backend` — the backend boundary.
//!
//! One `Backend` trait covers the three external collaborators the session
//! core depends on: the auth provider (bearer-token sessions), the relational
//! row store (profiles/companies/pins/communications), and the
//! security-definer registration procedure. Two implementations exist:
//!
//! - [`rest::RestBackend`] — JSON/HTTP against the hosted service.
//! - [`demo::DemoBackend`] — a fully local, seeded, in-memory substitute.
//!
//! Calling code selects an implementation once at the boundary and never
//! branches on demo-vs-real again.

pub mod demo;
pub mod error;
pub mod flags;
pub mod records;
pub mod rest;

use async_trait::async_trait;

use kaziflow_auth::{Actor, PinCredential};
use kaziflow_core::{ActorId, CommunicationId, PhoneNumber};

pub use error::BackendError;
pub use flags::{DEMO_MODE_FLAG, FileFlagStore, FlagStore, MemoryFlagStore};
pub use records::{
    AuthIdentity, Communication, CommunicationStatus, CommunicationType, NewCommunication,
    ProfileChanges, RegistrationRequest,
};

/// The full backend contract consumed by the session and communications
/// stores.
///
/// All operations suspend at the network (or its in-memory stand-in) and
/// return `BackendError` on failure; callers classify errors, they never
/// inspect transport details.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolve the current actor from the established session, if any.
    ///
    /// `Ok(None)` is the normal signed-out state, not a failure.
    async fn current_actor(&self) -> Result<Option<Actor>, BackendError>;

    /// Establish a session from a login identifier and password.
    async fn sign_in_with_password(
        &self,
        login: &str,
        password: &str,
    ) -> Result<AuthIdentity, BackendError>;

    /// Tear down the established session. Idempotent.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Look up the unique profile owning a normalized phone number.
    async fn find_profile_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<Actor>, BackendError>;

    /// Fetch the PIN credential row for an actor, if one exists.
    async fn pin_credential(
        &self,
        actor_id: ActorId,
    ) -> Result<Option<PinCredential>, BackendError>;

    /// Create or replace the PIN credential for an actor.
    async fn upsert_pin(&self, actor_id: ActorId, pin_hash: &str) -> Result<(), BackendError>;

    /// Apply a partial profile update.
    async fn update_profile(
        &self,
        actor_id: ActorId,
        changes: &ProfileChanges,
    ) -> Result<(), BackendError>;

    /// List communications visible to the current session, newest first.
    async fn list_communications(&self) -> Result<Vec<Communication>, BackendError>;

    /// Insert a communication; the stored row (with generated id, `pending`
    /// status and timestamps) is returned.
    async fn insert_communication(
        &self,
        new: &NewCommunication,
    ) -> Result<Communication, BackendError>;

    /// Transition a communication's status; the updated row is returned.
    async fn update_communication_status(
        &self,
        id: CommunicationId,
        status: CommunicationStatus,
    ) -> Result<Communication, BackendError>;

    /// Atomically create a tenant and its admin identity/profile.
    ///
    /// Executed server-side as one security-definer procedure; the client
    /// never sees a partial tenant. The raw structured result is returned
    /// for logging; callers establish a session with a follow-up sign-in.
    async fn register_company_and_admin(
        &self,
        request: &RegistrationRequest,
    ) -> Result<serde_json::Value, BackendError>;
}
