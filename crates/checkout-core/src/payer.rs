//! Payer Context
//!
//! Ephemeral, per-session buyer data: a validated email address and a
//! best-effort detected country. Geography is optional by design; checkout
//! never blocks on it.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A format-checked email address
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Validate and normalize an email address.
    ///
    /// Intentionally a shape check (local part, `@`, dotted domain), not
    /// full RFC 5321 parsing. Phone numbers are never accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() || input.contains(char::is_whitespace) {
            return Err(CoreError::InvalidEmail);
        }
        let Some((local, domain)) = input.split_once('@') else {
            return Err(CoreError::InvalidEmail);
        };
        if local.is_empty()
            || domain.len() < 3
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
            || domain.contains('@')
        {
            return Err(CoreError::InvalidEmail);
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-letter country code, validated before anything trusts it
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryCode(String);

impl CountryCode {
    /// Strict two-ASCII-letter gate. Applied to fetched values and to
    /// anything read back from a session cache.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.len() == 2 && input.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(input.to_ascii_uppercase()))
        } else {
            Err(CoreError::InvalidCountry(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ephemeral per-session payer data
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PayerContext {
    /// Detected country, if detection resolved in time
    pub country: Option<CountryCode>,

    /// Validated buyer email
    pub email: Email,
}
