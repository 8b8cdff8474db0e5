//! `kaziflow-session` — the session/authentication store and its demo-mode
//! fallback.
//!
//! The service object here is the single writer of session state: it
//! authenticates (password or phone+PIN), registers companies, maintains the
//! current actor, and degrades to a fully local demo backend when the real
//! one is unreachable or misconfigured. Construct one [`SessionService`] per
//! application, share it by `Arc`, and have UI layers read
//! [`SessionState`] snapshots.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use kaziflow_backend::rest::{RestBackend, RestBackendConfig};
//! use kaziflow_backend::FileFlagStore;
//! use kaziflow_session::SessionService;
//!
//! # async fn start() -> anyhow::Result<()> {
//! let backend = Arc::new(RestBackend::new(RestBackendConfig::from_env()?));
//! let flags = Arc::new(FileFlagStore::in_data_dir().expect("no data directory"));
//! let session = Arc::new(SessionService::new(backend, flags));
//! session.initialize().await;
//! # Ok(())
//! # }
//! ```

pub mod communications;
pub mod error;
pub mod fallback;
pub mod registration;
pub mod service;
pub mod state;

pub use communications::{CommunicationsService, CommunicationsState};
pub use error::SessionError;
pub use registration::CompanyRegistration;
pub use service::{PhoneLookup, SessionService};
pub use state::SessionState;

// The row/record types observers work with come from the backend boundary.
pub use kaziflow_backend::{
    Communication, CommunicationStatus, CommunicationType, NewCommunication, ProfileChanges,
};
