//! Request Lifecycle
//!
//! Creation (standard and premium), exclusive claiming by one authorized
//! responder, and the single forward transition to `Completed`.
//!
//! # Ordering
//!
//! Creation checks the circuit breaker and every input bound before the fee
//! moves, and writes nothing until the payment rail has accepted the fee:
//!
//! ```text
//! paused? ─→ inputs ok? ─→ counters have room? ─→ charge fee ─→ record request
//! ```

use std::collections::{BTreeMap, HashMap};

use askmarket_ledger::EntryReason;
use askmarket_types::{
    AccountId, Amount, MarketError, MarketEvent, PremiumTerms, Request, RequestId, RequestKind,
    RequestStatus, Response, Result, Timestamp,
};

use crate::integrity::integrity_tag;
use crate::market::{check_len, payment_error, Committed, MarketState, Marketplace};

/// Requests and their responses
#[derive(Debug)]
pub(crate) struct RequestBook {
    next_id: RequestId,
    requests: BTreeMap<RequestId, Request>,
    responses: HashMap<RequestId, Response>,
}

impl Default for RequestBook {
    fn default() -> Self {
        Self {
            next_id: RequestId::FIRST,
            requests: BTreeMap::new(),
            responses: HashMap::new(),
        }
    }
}

impl RequestBook {
    /// The ID the next request gets, checked before any payment
    pub(crate) fn peek_next_id(&self) -> Result<RequestId> {
        self.next_id.next().ok_or(MarketError::CounterOverflow)?;
        Ok(self.next_id)
    }

    /// Record a request under the ID returned by `peek_next_id`
    pub(crate) fn insert(&mut self, request: Request) {
        debug_assert_eq!(request.id, self.next_id);
        // Room was verified by peek_next_id
        self.next_id = self.next_id.next().unwrap_or(self.next_id);
        self.requests.insert(request.id, request);
    }

    pub(crate) fn get(&self, id: RequestId) -> Option<&Request> {
        self.requests.get(&id)
    }

    pub(crate) fn response(&self, id: RequestId) -> Option<&Response> {
        self.responses.get(&id)
    }

    pub(crate) fn total_requests(&self) -> u64 {
        self.next_id.value()
    }

    /// Claim an open request: the existence check and both writes happen
    /// together, so the first claim wins and every later one fails.
    pub(crate) fn claim(&mut self, response: Response) -> Result<()> {
        let request_id = response.request_id;
        let request = self
            .requests
            .get_mut(&request_id)
            .ok_or(MarketError::RequestNotFound { request_id })?;

        if self.responses.contains_key(&request_id) || !request.status.is_open() {
            return Err(MarketError::AlreadyResponded { request_id });
        }

        request.status = request.status.complete();
        self.responses.insert(request_id, response);
        Ok(())
    }

    /// Unanswered requests in ID order
    pub(crate) fn pending(&self) -> Vec<Request> {
        self.requests
            .values()
            .filter(|r| r.status.is_open())
            .cloned()
            .collect()
    }
}

/// Everything a premium request carries beyond the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumRequest {
    pub prompt: String,
    pub context_data: String,
    pub priority: u8,
    pub referral: Option<AccountId>,
}

impl PremiumRequest {
    pub fn new(prompt: impl Into<String>, context_data: impl Into<String>, priority: u8) -> Self {
        Self {
            prompt: prompt.into(),
            context_data: context_data.into(),
            priority,
            referral: None,
        }
    }

    pub fn with_referral(mut self, referral: AccountId) -> Self {
        self.referral = Some(referral);
        self
    }
}

impl Marketplace {
    /// Pay the standard fee and open a `Pending` request
    pub async fn request_standard(
        &self,
        caller: &AccountId,
        prompt: impl Into<String>,
    ) -> Result<RequestId> {
        let prompt = prompt.into();
        let mut state = self.state.lock().await;
        let outcome = self.create_standard(&mut state, caller, prompt).await;
        self.settle("request_standard", caller, outcome)
    }

    /// Pay the premium fee and open a `PremiumPending` request
    pub async fn request_premium(
        &self,
        caller: &AccountId,
        request: PremiumRequest,
    ) -> Result<RequestId> {
        let mut state = self.state.lock().await;
        let outcome = self.create_premium(&mut state, caller, request).await;
        self.settle("request_premium", caller, outcome)
    }

    /// Claim and answer a request as an authorized responder
    pub async fn provide_response(
        &self,
        caller: &AccountId,
        request_id: RequestId,
        text: impl Into<String>,
    ) -> Result<bool> {
        let text = text.into();
        let mut state = self.state.lock().await;
        let outcome = self.record_response(&mut state, caller, request_id, text);
        self.settle("provide_response", caller, outcome)
    }

    pub async fn get_request(&self, request_id: RequestId) -> Option<Request> {
        self.state.lock().await.book.get(request_id).cloned()
    }

    pub async fn get_response(&self, request_id: RequestId) -> Option<Response> {
        self.state.lock().await.book.response(request_id).cloned()
    }

    /// Requests still waiting for a responder, in ID order
    pub async fn pending_requests(&self) -> Vec<Request> {
        self.state.lock().await.book.pending()
    }

    async fn create_standard(
        &self,
        state: &mut MarketState,
        caller: &AccountId,
        prompt: String,
    ) -> Result<Committed<RequestId>> {
        state.controller.ensure_running()?;
        check_len("prompt", &prompt, self.config.max_prompt_len)?;

        let fee = self.config.standard_fee;
        let request_id = state.book.peek_next_id()?;
        let total_after = state.controller.total_after(fee)?;

        self.charge_fee(caller, fee, request_id, RequestKind::Standard).await?;

        // Committed from here on: nothing below can fail.
        let timestamp = self.clock.now();
        state.book.insert(Request {
            id: request_id,
            requester: caller.clone(),
            prompt: prompt.clone(),
            status: RequestStatus::initial(RequestKind::Standard),
            premium: false,
            fee,
            premium_terms: None,
            created_at: timestamp,
        });
        state.controller.total_fees_collected = total_after;

        tracing::info!(
            request_id = %request_id,
            requester = %caller,
            fee = fee.0,
            "standard request created"
        );

        Ok(Committed::new(
            request_id,
            vec![MarketEvent::RequestCreated {
                request_id,
                requester: caller.clone(),
                prompt,
                kind: RequestKind::Standard,
                integrity_tag: None,
                priority: None,
                referral: None,
                timestamp,
            }],
        ))
    }

    async fn create_premium(
        &self,
        state: &mut MarketState,
        caller: &AccountId,
        request: PremiumRequest,
    ) -> Result<Committed<RequestId>> {
        let PremiumRequest {
            prompt,
            context_data,
            priority,
            referral,
        } = request;

        state.controller.ensure_running()?;
        if !self.config.priority_in_range(priority) {
            return Err(MarketError::InvalidPriority {
                priority,
                min: self.config.min_priority,
                max: self.config.max_priority,
            });
        }
        check_len("prompt", &prompt, self.config.max_prompt_len)?;
        check_len("context data", &context_data, self.config.max_context_len)?;

        let tag = integrity_tag(&context_data);

        let fee = self.config.premium_fee()?;
        let request_id = state.book.peek_next_id()?;
        let total_after = state.controller.total_after(fee)?;

        self.charge_fee(caller, fee, request_id, RequestKind::Premium).await?;

        // Committed from here on: nothing below can fail.
        let timestamp = self.clock.now();
        state.book.insert(Request {
            id: request_id,
            requester: caller.clone(),
            prompt: prompt.clone(),
            status: RequestStatus::initial(RequestKind::Premium),
            premium: true,
            fee,
            premium_terms: Some(PremiumTerms {
                priority,
                integrity_tag: tag.clone(),
                referral: referral.clone(),
            }),
            created_at: timestamp,
        });
        state.controller.total_fees_collected = total_after;

        tracing::info!(
            request_id = %request_id,
            requester = %caller,
            fee = fee.0,
            priority,
            "premium request created"
        );

        let mut events = vec![MarketEvent::RequestCreated {
            request_id,
            requester: caller.clone(),
            prompt,
            kind: RequestKind::Premium,
            integrity_tag: Some(tag),
            priority: Some(priority),
            referral,
            timestamp,
        }];
        if self.config.is_urgent(priority) {
            raise_urgent_alert(&mut events, request_id, timestamp);
        }

        Ok(Committed::new(request_id, events))
    }

    fn record_response(
        &self,
        state: &mut MarketState,
        caller: &AccountId,
        request_id: RequestId,
        text: String,
    ) -> Result<Committed<bool>> {
        if state.book.get(request_id).is_none() {
            return Err(MarketError::RequestNotFound { request_id });
        }
        state.controller.ensure_running()?;
        if !state.registry.is_authorized(caller) {
            return Err(MarketError::not_authorized(caller, "answer requests"));
        }
        if state.book.response(request_id).is_some() {
            return Err(MarketError::AlreadyResponded { request_id });
        }
        check_len("response", &text, self.config.max_response_len)?;

        let timestamp = self.clock.now();
        state.book.claim(Response {
            request_id,
            responder: caller.clone(),
            text,
            responded_at: timestamp,
        })?;

        tracing::info!(request_id = %request_id, responder = %caller, "response recorded");

        Ok(Committed::new(
            true,
            vec![MarketEvent::ResponseProvided {
                request_id,
                responder: caller.clone(),
                timestamp,
            }],
        ))
    }

    async fn charge_fee(
        &self,
        caller: &AccountId,
        fee: Amount,
        request_id: RequestId,
        kind: RequestKind,
    ) -> Result<()> {
        self.rail
            .transfer(
                caller,
                &self.config.custody_account,
                fee,
                EntryReason::RequestFee { request_id, kind },
            )
            .await
            .map_err(payment_error)?;
        Ok(())
    }
}

/// Side notification for high-priority premium requests
///
/// Only appends to the notification buffer; it has no input into whether
/// the request succeeds.
fn raise_urgent_alert(events: &mut Vec<MarketEvent>, request_id: RequestId, timestamp: Timestamp) {
    tracing::info!(request_id = %request_id, "urgent priority alert raised");
    events.push(MarketEvent::UrgentPriorityAlert {
        request_id,
        timestamp,
    });
}
