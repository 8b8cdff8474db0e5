//! PIN credential storage model and hashing.
//!
//! PINs are stored as salted Argon2 hashes, never as raw values.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kaziflow_core::{ActorId, Pin};

/// A PIN credential row, 1:1 with an actor.
///
/// `pin_set` is a separate flag from the hash being present: an actor can be
/// provisioned (row created, PIN pending) before completing onboarding
/// through the external channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinCredential {
    pub actor_id: ActorId,
    pub pin_hash: String,
    pub pin_set: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to hash PIN: {0}")]
pub struct PinHashError(String);

/// Hash a PIN with a fresh random salt.
pub fn hash_pin(pin: &Pin) -> Result<String, PinHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(pin.as_str().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PinHashError(e.to_string()))
}

/// Verify a presented PIN against a stored hash.
///
/// An unparseable stored hash verifies as `false` rather than erroring; the
/// caller cannot do anything useful with the distinction and must not leak
/// it.
pub fn verify_pin(pin: &Pin, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(pin.as_str().as_bytes(), &parsed)
        .is_ok()
}
