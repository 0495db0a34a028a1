//! Marketplace notifications
//!
//! Events are side-channel notifications for off-chain observers. They are
//! published only after the operation that produced them commits and are
//! never part of an operation's return value.

use crate::{AccountId, Amount, IntegrityTag, RequestId, RequestKind, Timestamp};
use serde::{Deserialize, Serialize};

/// Notifications emitted by the marketplace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MarketEvent {
    /// A paid request was recorded
    RequestCreated {
        request_id: RequestId,
        requester: AccountId,
        prompt: String,
        kind: RequestKind,
        /// Premium only
        integrity_tag: Option<IntegrityTag>,
        /// Premium only
        priority: Option<u8>,
        /// Premium only, and only when supplied
        referral: Option<AccountId>,
        timestamp: Timestamp,
    },

    /// A premium request above the urgent threshold was recorded
    UrgentPriorityAlert {
        request_id: RequestId,
        timestamp: Timestamp,
    },

    /// A responder claimed and answered a request
    ResponseProvided {
        request_id: RequestId,
        responder: AccountId,
        timestamp: Timestamp,
    },

    /// The requester rated the response
    RatingSubmitted {
        request_id: RequestId,
        score: u8,
        rater: AccountId,
        timestamp: Timestamp,
    },

    /// A responder was added to the whitelist
    ResponderAuthorized {
        responder: AccountId,
        timestamp: Timestamp,
    },

    /// A responder was removed from the whitelist
    ResponderRevoked {
        responder: AccountId,
        timestamp: Timestamp,
    },

    /// The circuit breaker was set
    PauseChanged {
        paused: bool,
        timestamp: Timestamp,
    },

    /// Custodied fees were moved to the administrator
    FeesWithdrawn {
        amount: Amount,
        recipient: AccountId,
        timestamp: Timestamp,
    },
}

impl MarketEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> Timestamp {
        match self {
            MarketEvent::RequestCreated { timestamp, .. } => *timestamp,
            MarketEvent::UrgentPriorityAlert { timestamp, .. } => *timestamp,
            MarketEvent::ResponseProvided { timestamp, .. } => *timestamp,
            MarketEvent::RatingSubmitted { timestamp, .. } => *timestamp,
            MarketEvent::ResponderAuthorized { timestamp, .. } => *timestamp,
            MarketEvent::ResponderRevoked { timestamp, .. } => *timestamp,
            MarketEvent::PauseChanged { timestamp, .. } => *timestamp,
            MarketEvent::FeesWithdrawn { timestamp, .. } => *timestamp,
        }
    }

    /// The request this event refers to, if any
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            MarketEvent::RequestCreated { request_id, .. }
            | MarketEvent::UrgentPriorityAlert { request_id, .. }
            | MarketEvent::ResponseProvided { request_id, .. }
            | MarketEvent::RatingSubmitted { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    /// Get a short description for logging
    pub fn summary(&self) -> String {
        match self {
            MarketEvent::RequestCreated { request_id, requester, kind, priority, .. } => {
                match priority {
                    Some(p) => format!("{} {} request by {} (priority {})", request_id, kind, requester, p),
                    None => format!("{} {} request by {}", request_id, kind, requester),
                }
            }
            MarketEvent::UrgentPriorityAlert { request_id, .. } => {
                format!("URGENT: {} needs attention", request_id)
            }
            MarketEvent::ResponseProvided { request_id, responder, .. } => {
                format!("{} answered by {}", request_id, responder)
            }
            MarketEvent::RatingSubmitted { request_id, score, rater, .. } => {
                format!("{} rated {} by {}", request_id, score, rater)
            }
            MarketEvent::ResponderAuthorized { responder, .. } => {
                format!("Responder authorized: {}", responder)
            }
            MarketEvent::ResponderRevoked { responder, .. } => {
                format!("Responder revoked: {}", responder)
            }
            MarketEvent::PauseChanged { paused, .. } => {
                if *paused {
                    "Marketplace paused".to_string()
                } else {
                    "Marketplace resumed".to_string()
                }
            }
            MarketEvent::FeesWithdrawn { amount, recipient, .. } => {
                format!("Withdrew {} to {}", amount, recipient)
            }
        }
    }
}
