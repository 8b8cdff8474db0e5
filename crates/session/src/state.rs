//! Session state snapshot and lock plumbing.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use kaziflow_auth::Actor;

use crate::error::SessionError;

/// The process-wide session state, read by the whole application and mutated
/// only through [`crate::SessionService`] operations.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub actor: Option<Actor>,
    pub is_loading: bool,
    pub last_error: Option<SessionError>,
    pub demo_mode: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            actor: None,
            // Loading until `initialize` has run.
            is_loading: true,
            last_error: None,
            demo_mode: false,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.actor.is_some()
    }
}

/// Lock a state cell for reading, recovering from poisoning.
pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

/// Lock a state cell for writing, recovering from poisoning.
pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for the loading flag.
///
/// Raises `is_loading` (and clears `last_error`) on construction and forces
/// `is_loading = false` on drop. Every exit path of an operation restores the
/// flag, including panics.
pub(crate) struct LoadingGuard<'a> {
    state: &'a RwLock<SessionState>,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn begin(state: &'a RwLock<SessionState>) -> Self {
        {
            let mut s = write_lock(state);
            s.is_loading = true;
            s.last_error = None;
        }
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        write_lock(self.state).is_loading = false;
    }
}
