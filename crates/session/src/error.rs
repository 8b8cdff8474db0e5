//! Session error taxonomy.

use thiserror::Error;

use kaziflow_core::DomainError;
use kaziflow_backend::BackendError;

/// Error surfaced by session and communications operations.
///
/// `Clone` on purpose: every failure is both recorded into
/// `SessionState.last_error` for passive observers and rethrown to the caller
/// for user-facing presentation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("profile not found")]
    ProfileNotFound,

    /// The credential record exists (or is absent) but no PIN has been
    /// established; the actor must finish onboarding through the external
    /// channel, so "invalid PIN" would mislead them.
    #[error("PIN not set; complete registration through the onboarding channel")]
    PinNotSet,

    #[error("invalid PIN")]
    InvalidPin,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("company code already in use")]
    DuplicateCompanyCode,

    #[error("email already registered")]
    EmailAlreadyRegistered,

    #[error("registration failed: {0}")]
    RegistrationFailed(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

impl SessionError {
    /// Map a backend failure into the session taxonomy.
    ///
    /// Environmental failures normally never reach this point (the fallback
    /// controller intercepts them); when they do, e.g. on sign-out which has
    /// no demo fallback, they surface as `Network`.
    pub(crate) fn from_backend(err: BackendError) -> Self {
        match err {
            BackendError::InvalidCredentials => SessionError::InvalidCredentials,
            BackendError::NotFound => SessionError::ProfileNotFound,
            BackendError::Network(msg) => SessionError::Network(msg),
            other if other.is_environmental() => SessionError::Network(other.to_string()),
            other => SessionError::Backend(other.to_string()),
        }
    }
}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        SessionError::Validation(err.to_string())
    }
}
