//! Ratings left by requesters on completed requests

use crate::{AccountId, RequestId, Timestamp};
use serde::{Deserialize, Serialize};

/// Inclusive score bounds for ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBounds {
    pub min: u8,
    pub max: u8,
}

impl RatingBounds {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, score: u8) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

impl Default for RatingBounds {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

/// Write-once feedback on a completed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub request_id: RequestId,
    /// Always the original requester
    pub rater: AccountId,
    pub score: u8,
    pub comment: Option<String>,
    pub rated_at: Timestamp,
}
