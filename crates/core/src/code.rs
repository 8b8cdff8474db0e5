//! Company code value object.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Unique human-chosen tenant code (e.g. `acme-inc`).
///
/// Restricted to ASCII letters, digits, hyphens and underscores. Uniqueness
/// across tenants is enforced by the backend; this type only guarantees the
/// character class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyCode(String);

impl CompanyCode {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("company code must not be empty"));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::validation(
                "company code may only contain letters, digits, hyphens or underscores",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CompanyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CompanyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CompanyCode> for String {
    fn from(value: CompanyCode) -> Self {
        value.0
    }
}
