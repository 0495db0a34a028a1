//! Error types for AskMarket
//!
//! Every failure aborts the whole operation with no observable effect, and
//! every failure is surfaced to the caller with its specific kind.

use crate::{AccountId, RequestId};
use thiserror::Error;

/// Result type for AskMarket operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// AskMarket error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    // ========================================================================
    // Access Errors
    // ========================================================================

    /// Caller lacks the required role (administrator or authorized responder)
    #[error("Not authorized: {caller} cannot {action}")]
    NotAuthorized { caller: AccountId, action: String },

    /// Rating attempted by someone other than the requester
    #[error("{caller} is not the requester of {request_id}")]
    NotRequester { caller: AccountId, request_id: RequestId },

    /// Circuit breaker engaged
    #[error("Marketplace is paused")]
    Paused,

    // ========================================================================
    // Payment Errors
    // ========================================================================

    /// Payment rail rejected the transfer
    #[error("Insufficient balance in {account}: need {required}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        required: u64,
        available: u64,
    },

    /// Amount is not acceptable for the operation
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Payment rail failed for a reason other than balance
    #[error("Payment rail failure: {message}")]
    Payment { message: String, retriable: bool },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================

    /// Request absent, or not in the status the operation needs
    #[error("Request {request_id} not found or not ready")]
    RequestNotFound { request_id: RequestId },

    /// Premium priority outside the allowed range
    #[error("Invalid priority {priority}: must be between {min} and {max}")]
    InvalidPriority { priority: u8, min: u8, max: u8 },

    /// Another responder already claimed the request
    #[error("Request {request_id} has already been answered")]
    AlreadyResponded { request_id: RequestId },

    /// The request counter cannot advance
    #[error("Request counter exhausted")]
    CounterOverflow,

    // ========================================================================
    // Rating Errors
    // ========================================================================

    /// Score outside the configured bounds
    #[error("Invalid rating {score}: must be between {min} and {max}")]
    InvalidRating { score: u8, min: u8, max: u8 },

    /// Request was already rated
    #[error("Request {request_id} has already been rated")]
    AlreadyRated { request_id: RequestId },

    // ========================================================================
    // Input Errors
    // ========================================================================

    /// Text exceeds its configured bound
    #[error("{field} too long: {actual} characters exceeds limit of {max}")]
    TextTooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    /// Invalid input
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    /// Configuration rejected at construction
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl MarketError {
    /// Create an invalid input error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an unauthorized error
    pub fn not_authorized(caller: &AccountId, action: impl Into<String>) -> Self {
        Self::NotAuthorized {
            caller: caller.clone(),
            action: action.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a retriable error
    ///
    /// Business-rule failures are final; only an unavailable payment rail
    /// may succeed on a later attempt.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Payment { retriable: true, .. })
    }

    /// Get an error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthorized { .. } => "NOT_AUTHORIZED",
            Self::NotRequester { .. } => "NOT_REQUESTER",
            Self::Paused => "PAUSED",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::Payment { .. } => "PAYMENT_FAILED",
            Self::RequestNotFound { .. } => "REQUEST_NOT_FOUND",
            Self::InvalidPriority { .. } => "INVALID_PRIORITY",
            Self::AlreadyResponded { .. } => "ALREADY_RESPONDED",
            Self::CounterOverflow => "COUNTER_OVERFLOW",
            Self::InvalidRating { .. } => "INVALID_RATING",
            Self::AlreadyRated { .. } => "ALREADY_RATED",
            Self::TextTooLong { .. } => "TEXT_TOO_LONG",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = MarketError::AlreadyResponded {
            request_id: RequestId(0),
        };
        assert_eq!(err.error_code(), "ALREADY_RESPONDED");
        assert_eq!(MarketError::Paused.error_code(), "PAUSED");
    }

    #[test]
    fn test_retriable_errors() {
        let outage = MarketError::Payment {
            message: "rail offline".to_string(),
            retriable: true,
        };
        assert!(outage.is_retriable());

        let not_found = MarketError::RequestNotFound {
            request_id: RequestId(9),
        };
        assert!(!not_found.is_retriable());
        assert!(!MarketError::Paused.is_retriable());
    }

    #[test]
    fn test_messages_name_the_subject() {
        let err = MarketError::not_authorized(&AccountId::new("mallory"), "pause the marketplace");
        assert_eq!(
            err.to_string(),
            "Not authorized: mallory cannot pause the marketplace"
        );
    }
}
