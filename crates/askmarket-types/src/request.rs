//! Request and Response records
//!
//! A request is paid for up front and waits, without expiry, until exactly
//! one authorized responder answers it.

use crate::{AccountId, Amount, RequestId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a request
///
/// Transitions only move forward: either open state goes to `Completed`,
/// and nothing leaves `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Standard request awaiting a response
    Pending,
    /// Premium request awaiting a response
    PremiumPending,
    /// A response has been recorded
    Completed,
}

impl RequestStatus {
    /// Initial status for a request of the given kind
    pub fn initial(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Standard => Self::Pending,
            RequestKind::Premium => Self::PremiumPending,
        }
    }

    /// Check if the request can still be claimed by a responder
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::PremiumPending)
    }

    /// Check if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Status after a response is recorded
    pub fn complete(self) -> Self {
        Self::Completed
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PremiumPending => "premium-pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which entry point created a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Standard,
    Premium,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Premium => f.write_str("premium"),
        }
    }
}

/// Opaque digest over premium context data
///
/// Off-chain responders use it to check they received the context the
/// requester paid for. The marketplace never validates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrityTag(pub String);

impl IntegrityTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntegrityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extra terms recorded for premium requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumTerms {
    /// Priority level in the configured range
    pub priority: u8,
    /// Digest of the context data
    pub integrity_tag: IntegrityTag,
    /// Optional identity that referred the requester
    pub referral: Option<AccountId>,
}

/// A paid request for an AI-generated response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Sequential ID, never reused
    pub id: RequestId,
    /// Who paid for the request
    pub requester: AccountId,
    /// Prompt text
    pub prompt: String,
    /// Current lifecycle status
    pub status: RequestStatus,
    /// Whether the premium fee was paid
    pub premium: bool,
    /// Fee charged at creation
    pub fee: Amount,
    /// Premium terms, present iff `premium`
    pub premium_terms: Option<PremiumTerms>,
    /// Logical creation time
    pub created_at: Timestamp,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        if self.premium {
            RequestKind::Premium
        } else {
            RequestKind::Standard
        }
    }

    /// Check if `account` created this request
    pub fn is_requester(&self, account: &AccountId) -> bool {
        &self.requester == account
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }
}

/// The single answer bound to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// The request this answers
    pub request_id: RequestId,
    /// Authorized responder that claimed the request
    pub responder: AccountId,
    /// Response text
    pub text: String,
    /// Logical response time
    pub responded_at: Timestamp,
}

/// Read-only marketplace counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStats {
    /// Number of requests ever created (also the next ID to assign)
    pub total_requests: u64,
    /// Lifetime fee volume; withdrawals do not reduce it
    pub total_fees_collected: Amount,
    /// Whether the circuit breaker is engaged
    pub paused: bool,
}
