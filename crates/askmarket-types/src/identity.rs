//! Identity types for AskMarket
//!
//! Account identities come from the host identity system and are opaque
//! strings. Request identities are sequential integers assigned by the
//! marketplace and never reused.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{MarketError, Result};

/// Maximum length of an account identity
pub const MAX_ACCOUNT_ID_LEN: usize = 128;

/// Identity of a caller: requester, responder, administrator or custody
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an identity supplied by a trusted host
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an identity from untrusted input
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MarketError::invalid_input("account", "identity must not be empty"));
        }
        if trimmed.len() > MAX_ACCOUNT_ID_LEN {
            return Err(MarketError::invalid_input(
                "account",
                format!("identity longer than {} bytes", MAX_ACCOUNT_ID_LEN),
            ));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(MarketError::invalid_input("account", "identity must not contain whitespace"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sequential identifier of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    /// The first identifier handed out by a fresh marketplace
    pub const FIRST: RequestId = RequestId(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The identifier following this one, if the counter has room
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req_{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
