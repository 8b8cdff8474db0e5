//! `kaziflow-auth` — the authenticated-principal model.
//!
//! Pure identity/authorization types: who the actor is, which tenant they
//! belong to, which role they carry, and how PIN credentials are hashed and
//! verified. Intentionally decoupled from transport and storage.

pub mod actor;
pub mod authorize;
pub mod channel;
pub mod pin_credential;
pub mod roles;

pub use actor::{Actor, Tenant};
pub use authorize::{AuthzError, require_role};
pub use channel::CommunicationChannel;
pub use pin_credential::{PinCredential, PinHashError, hash_pin, verify_pin};
pub use roles::Role;
