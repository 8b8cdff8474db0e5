//! PIN value object.

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// A 4-digit numeric PIN.
///
/// Exactly four ASCII digits; no prefix matching ("123" never equals "1234").
/// The raw value only exists in memory long enough to be hashed or verified,
/// so `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Pin(String);

pub const PIN_LENGTH: usize = 4;

impl Pin {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if raw.len() != PIN_LENGTH || !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation("PIN must be exactly 4 digits"));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Pin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Pin(****)")
    }
}
