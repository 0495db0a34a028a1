//! Rating Ledger
//!
//! One write-once rating per completed request, left by its requester.

use std::collections::HashMap;

use askmarket_types::{AccountId, MarketError, MarketEvent, Rating, RequestId, Result};

use crate::market::{check_len, Committed, MarketState, Marketplace};

#[derive(Debug, Default)]
pub(crate) struct RatingLedger {
    ratings: HashMap<RequestId, Rating>,
}

impl RatingLedger {
    pub(crate) fn get(&self, request_id: RequestId) -> Option<&Rating> {
        self.ratings.get(&request_id)
    }

    /// Store a rating; a second rating for the same request is refused
    pub(crate) fn record(&mut self, rating: Rating) -> Result<()> {
        let request_id = rating.request_id;
        if self.ratings.contains_key(&request_id) {
            return Err(MarketError::AlreadyRated { request_id });
        }
        self.ratings.insert(request_id, rating);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.ratings.len()
    }
}

impl Marketplace {
    /// Rate the response to one of the caller's own completed requests
    pub async fn rate_response(
        &self,
        caller: &AccountId,
        request_id: RequestId,
        score: u8,
        comment: Option<String>,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        let outcome = self.record_rating(&mut state, caller, request_id, score, comment);
        self.settle("rate_response", caller, outcome)
    }

    pub async fn get_rating(&self, request_id: RequestId) -> Option<Rating> {
        self.state.lock().await.ratings.get(request_id).cloned()
    }

    /// Number of ratings recorded so far
    pub async fn rating_count(&self) -> usize {
        self.state.lock().await.ratings.len()
    }

    fn record_rating(
        &self,
        state: &mut MarketState,
        caller: &AccountId,
        request_id: RequestId,
        score: u8,
        comment: Option<String>,
    ) -> Result<Committed<bool>> {
        let request = state
            .book
            .get(request_id)
            .ok_or(MarketError::RequestNotFound { request_id })?;
        if !request.is_requester(caller) {
            return Err(MarketError::NotRequester {
                caller: caller.clone(),
                request_id,
            });
        }
        // Not ready to rate until a response exists
        if !request.is_completed() || state.book.response(request_id).is_none() {
            return Err(MarketError::RequestNotFound { request_id });
        }

        let bounds = self.config.rating_bounds();
        if !bounds.contains(score) {
            return Err(MarketError::InvalidRating {
                score,
                min: bounds.min,
                max: bounds.max,
            });
        }
        if let Some(comment) = &comment {
            check_len("comment", comment, self.config.max_comment_len)?;
        }
        if state.ratings.get(request_id).is_some() {
            return Err(MarketError::AlreadyRated { request_id });
        }

        let timestamp = self.clock.now();
        state.ratings.record(Rating {
            request_id,
            rater: caller.clone(),
            score,
            comment,
            rated_at: timestamp,
        })?;

        tracing::info!(request_id = %request_id, rater = %caller, score, "rating submitted");

        Ok(Committed::new(
            true,
            vec![MarketEvent::RatingSubmitted {
                request_id,
                score,
                rater: caller.clone(),
                timestamp,
            }],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(id: u64, score: u8) -> Rating {
        Rating {
            request_id: RequestId(id),
            rater: AccountId::new("alice"),
            score,
            comment: None,
            rated_at: 1,
        }
    }

    #[test]
    fn test_ratings_are_write_once() {
        let mut ledger = RatingLedger::default();
        ledger.record(rating(0, 5)).unwrap();

        assert_eq!(
            ledger.record(rating(0, 1)),
            Err(MarketError::AlreadyRated {
                request_id: RequestId(0)
            })
        );
        assert_eq!(ledger.get(RequestId(0)).unwrap().score, 5);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_separate_requests_rate_independently() {
        let mut ledger = RatingLedger::default();
        ledger.record(rating(0, 2)).unwrap();
        ledger.record(rating(1, 4)).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.get(RequestId(2)).is_none());
    }
}
