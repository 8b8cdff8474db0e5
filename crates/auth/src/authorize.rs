//! Role gating.

use thiserror::Error;

use crate::{Actor, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: requires one of {0:?}")]
    Forbidden(Vec<Role>),
}

/// Authorize an actor against a set of accepted roles.
///
/// - No IO
/// - No panics
/// - Pure policy check; route guards call this before rendering gated views.
pub fn require_role(actor: &Actor, accepted: &[Role]) -> Result<(), AuthzError> {
    if accepted.contains(&actor.role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(accepted.to_vec()))
    }
}
