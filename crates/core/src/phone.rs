//! Phone number value object and dial-code normalization.
//!
//! Country *lookup* (ISO code → dial code) lives outside this core; callers
//! hand us the dial code they resolved. Normalization brings whatever the
//! user typed into the canonical international form stored on profiles.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// International dial code, e.g. `+255`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DialCode(String);

impl DialCode {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        let Some(digits) = trimmed.strip_prefix('+') else {
            return Err(DomainError::validation("dial code must start with '+'"));
        };
        if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "'{trimmed}' is not a valid dial code"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DialCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DialCode> for String {
    fn from(value: DialCode) -> Self {
        value.0
    }
}

/// Normalized international phone number (`+` followed by 7–15 digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a number that is already internationally formatted.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let cleaned = strip_separators(raw);
        validate_international(&cleaned)?;
        Ok(Self(cleaned))
    }

    /// Normalize user input against a dial code.
    ///
    /// Separators (spaces, dashes, parentheses) and leading zeros are
    /// stripped. Input already carrying the dial code, or any `+` prefix, is
    /// passed through unchanged; everything else gets the dial code
    /// prepended.
    pub fn normalize(dial: &DialCode, raw: &str) -> DomainResult<Self> {
        let cleaned = strip_separators(raw);
        let cleaned = cleaned.trim_start_matches('0');

        let formatted = if cleaned.starts_with(dial.as_str()) || cleaned.starts_with('+') {
            cleaned.to_string()
        } else {
            format!("{}{}", dial.as_str(), cleaned)
        };

        validate_international(&formatted)?;
        Ok(Self(formatted))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn strip_separators(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

fn validate_international(s: &str) -> DomainResult<()> {
    let digits = s.strip_prefix('+').unwrap_or(s);
    if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation(format!(
            "'{s}' is not a valid phone number"
        )));
    }
    Ok(())
}

impl core::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}
