//! Backend error model and environmental classification.

use thiserror::Error;

/// Error produced by a backend operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The auth provider rejected the presented credentials.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// A single-row expectation found nothing.
    #[error("row not found")]
    NotFound,

    /// Transport-level failure (connect, DNS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered with a body we could not interpret.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Message fragments that mark a failure as environmental: the backend is
/// unreachable or misconfigured (row-level-security lockout), not rejecting
/// this particular request on its merits.
const ENVIRONMENTAL_MARKERS: [&str; 5] = [
    "Failed to fetch",
    "network",
    "row-level security",
    "policy",
    "violates",
];

impl BackendError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this failure should degrade the application into demo mode
    /// rather than surface to the caller.
    pub fn is_environmental(&self) -> bool {
        match self {
            BackendError::Network(_) => true,
            BackendError::Api { message, .. } => {
                // Duplicate-key messages contain "violates unique constraint"
                // but are domain failures, never a reason to leave the real
                // backend.
                !message.contains("duplicate key")
                    && ENVIRONMENTAL_MARKERS.iter().any(|m| message.contains(m))
            }
            _ => false,
        }
    }

    /// Duplicate-key signal from the relational store (unique constraint).
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, BackendError::Api { message, .. } if message.contains("duplicate key"))
    }

    /// "User already registered" signal from the auth provider.
    pub fn is_already_registered(&self) -> bool {
        matches!(self, BackendError::Api { message, .. } if message.contains("already registered"))
    }
}
