//! Scripted marketplace runs
//!
//! A script opens a fresh in-memory marketplace with the given balances and
//! replays a list of operations against it, recording every outcome.
//!
//! ```json
//! {
//!   "balances": { "alice": 10000000 },
//!   "steps": [
//!     { "op": "authorize", "caller": "admin", "responder": "bot-b" },
//!     { "op": "request_standard", "caller": "alice", "prompt": "hello" },
//!     { "op": "provide_response", "caller": "bot-b", "request_id": 0, "text": "hi" },
//!     { "op": "rate_response", "caller": "alice", "request_id": 0, "score": 5 }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use askmarket_core::{
    AccountId, Amount, Ledger, MarketConfig, MarketError, MarketEvent, MarketStats, Marketplace,
    PremiumRequest, RequestId,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A scripted run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    /// Opening balances on the payment rail
    #[serde(default)]
    pub balances: BTreeMap<AccountId, u64>,

    /// Operations, executed in order
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One marketplace operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Authorize {
        caller: AccountId,
        responder: AccountId,
    },
    Revoke {
        caller: AccountId,
        responder: AccountId,
    },
    SetPaused {
        caller: AccountId,
        paused: bool,
    },
    WithdrawFees {
        caller: AccountId,
        amount: u64,
    },
    RequestStandard {
        caller: AccountId,
        prompt: String,
    },
    RequestPremium {
        caller: AccountId,
        prompt: String,
        context_data: String,
        priority: u8,
        #[serde(default)]
        referral: Option<AccountId>,
    },
    ProvideResponse {
        caller: AccountId,
        request_id: u64,
        text: String,
    },
    RateResponse {
        caller: AccountId,
        request_id: u64,
        score: u8,
        #[serde(default)]
        comment: Option<String>,
    },
    GetRequest {
        request_id: u64,
    },
    GetStats,
}

impl Step {
    /// Operation name as written in scripts
    pub fn name(&self) -> &'static str {
        match self {
            Step::Authorize { .. } => "authorize",
            Step::Revoke { .. } => "revoke",
            Step::SetPaused { .. } => "set_paused",
            Step::WithdrawFees { .. } => "withdraw_fees",
            Step::RequestStandard { .. } => "request_standard",
            Step::RequestPremium { .. } => "request_premium",
            Step::ProvideResponse { .. } => "provide_response",
            Step::RateResponse { .. } => "rate_response",
            Step::GetRequest { .. } => "get_request",
            Step::GetStats => "get_stats",
        }
    }
}

/// Result of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    pub result: std::result::Result<Value, StepFailure>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Error code of a failed step
    pub fn code(&self) -> Option<&'static str> {
        self.result.as_ref().err().map(|failure| failure.code)
    }
}

/// A rejected step
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub code: &'static str,
    pub message: String,
}

impl From<MarketError> for StepFailure {
    fn from(err: MarketError) -> Self {
        Self {
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<StepOutcome>,
    pub events: Vec<MarketEvent>,
    pub stats: MarketStats,
    pub custody_balance: Amount,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }
}

impl Script {
    /// Read a script from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse script {}", path.display()))
    }

    /// The canonical walkthrough: authorize, ask, answer, race, rate, and a
    /// rejected rating from a stranger
    ///
    /// Fails when the configured fees are too large to fund the walkthrough.
    pub fn demo(config: &MarketConfig) -> anyhow::Result<Self> {
        let admin = config.admin.clone();
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");
        let bot_a = AccountId::new("bot-a");
        let bot_b = AccountId::new("bot-b");
        let fee = config.standard_fee.value();

        let steps = vec![
            Step::Authorize {
                caller: admin.clone(),
                responder: bot_b.clone(),
            },
            Step::RequestStandard {
                caller: alice.clone(),
                prompt: "hello".to_string(),
            },
            Step::ProvideResponse {
                caller: bot_b.clone(),
                request_id: 0,
                text: "hi".to_string(),
            },
            Step::Authorize {
                caller: admin.clone(),
                responder: bot_a.clone(),
            },
            Step::ProvideResponse {
                caller: bot_a.clone(),
                request_id: 0,
                text: "hi again".to_string(),
            },
            Step::RateResponse {
                caller: alice.clone(),
                request_id: 0,
                score: 5,
                comment: Some("great".to_string()),
            },
            Step::RateResponse {
                caller: bob.clone(),
                request_id: 0,
                score: 3,
                comment: Some("meh".to_string()),
            },
            Step::RequestPremium {
                caller: bob.clone(),
                prompt: "summarize this".to_string(),
                context_data: "quarterly numbers".to_string(),
                priority: 9,
                referral: Some(alice.clone()),
            },
            Step::ProvideResponse {
                caller: bot_a,
                request_id: 1,
                text: "done".to_string(),
            },
            Step::WithdrawFees {
                caller: admin,
                amount: fee,
            },
            Step::GetStats,
        ];

        let alice_funds = fee
            .checked_mul(10)
            .context("Standard fee too large to fund the demo")?;
        let bob_funds = alice_funds
            .checked_mul(config.premium_multiplier)
            .context("Premium fee too large to fund the demo")?;

        let mut balances = BTreeMap::new();
        balances.insert(alice, alice_funds);
        balances.insert(bob, bob_funds);

        Ok(Self { balances, steps })
    }

    /// Execute against a fresh marketplace
    pub async fn run(&self, config: MarketConfig) -> anyhow::Result<RunReport> {
        let ledger = Ledger::with_balances(
            self.balances
                .iter()
                .map(|(account, amount)| (account.clone(), Amount::new(*amount))),
        )
        .await?;
        let market = Marketplace::with_ledger(config, ledger)?;

        let mut outcomes = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let result = apply(&market, step).await.map_err(StepFailure::from);
            tracing::debug!(index, op = step.name(), ok = result.is_ok(), "script step");
            outcomes.push(StepOutcome {
                index,
                op: step.name(),
                result,
            });
        }

        Ok(RunReport {
            outcomes,
            events: market.events().journal(),
            stats: market.get_stats().await,
            custody_balance: market.custody_balance().await,
        })
    }
}

async fn apply(market: &Marketplace, step: &Step) -> askmarket_core::Result<Value> {
    let value = match step {
        Step::Authorize { caller, responder } => {
            market.authorize(caller, responder).await?;
            Value::Null
        }
        Step::Revoke { caller, responder } => {
            market.revoke(caller, responder).await?;
            Value::Null
        }
        Step::SetPaused { caller, paused } => {
            market.set_paused(caller, *paused).await?;
            json!({ "paused": paused })
        }
        Step::WithdrawFees { caller, amount } => {
            let withdrawn = market.withdraw_fees(caller, Amount::new(*amount)).await?;
            json!({ "withdrawn": withdrawn })
        }
        Step::RequestStandard { caller, prompt } => {
            let id = market.request_standard(caller, prompt.clone()).await?;
            json!({ "request_id": id })
        }
        Step::RequestPremium {
            caller,
            prompt,
            context_data,
            priority,
            referral,
        } => {
            let mut request = PremiumRequest::new(prompt.clone(), context_data.clone(), *priority);
            if let Some(referral) = referral {
                request = request.with_referral(referral.clone());
            }
            let id = market.request_premium(caller, request).await?;
            json!({ "request_id": id })
        }
        Step::ProvideResponse {
            caller,
            request_id,
            text,
        } => {
            let ok = market
                .provide_response(caller, RequestId(*request_id), text.clone())
                .await?;
            Value::Bool(ok)
        }
        Step::RateResponse {
            caller,
            request_id,
            score,
            comment,
        } => {
            let ok = market
                .rate_response(caller, RequestId(*request_id), *score, comment.clone())
                .await?;
            Value::Bool(ok)
        }
        Step::GetRequest { request_id } => {
            let request = market.get_request(RequestId(*request_id)).await;
            serde_json::to_value(request).unwrap_or(Value::Null)
        }
        Step::GetStats => {
            serde_json::to_value(market.get_stats().await).unwrap_or(Value::Null)
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script: Script = serde_json::from_str(
            r#"{
                "balances": { "alice": 5 },
                "steps": [
                    { "op": "set_paused", "caller": "admin", "paused": true },
                    { "op": "request_premium", "caller": "alice", "prompt": "p",
                      "context_data": "c", "priority": 3 },
                    { "op": "get_stats" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(script.balances[&AccountId::new("alice")], 5);
        assert_eq!(script.steps.len(), 3);
        assert_eq!(script.steps[0].name(), "set_paused");
        assert!(matches!(
            &script.steps[1],
            Step::RequestPremium { priority: 3, referral: None, .. }
        ));
        assert_eq!(script.steps[2], Step::GetStats);
    }

    #[test]
    fn test_bundled_script_parses() {
        let script: Script =
            serde_json::from_str(include_str!("../scripts/canonical.json")).unwrap();
        assert!(!script.steps.is_empty());
    }

    #[tokio::test]
    async fn test_demo_outcomes() {
        let config = MarketConfig::default();
        let report = Script::demo(&config).unwrap().run(config).await.unwrap();

        let codes: Vec<Option<&str>> = report.outcomes.iter().map(|o| o.code()).collect();
        assert_eq!(
            codes,
            vec![
                None,
                None,
                None,
                None,
                Some("ALREADY_RESPONDED"),
                None,
                Some("NOT_REQUESTER"),
                None,
                None,
                None,
                None,
            ]
        );
        assert_eq!(report.failures(), 2);
        assert_eq!(report.stats.total_requests, 2);

        let fee = config_fee();
        assert_eq!(report.stats.total_fees_collected, Amount::new(fee * 6));
        assert_eq!(report.custody_balance, Amount::new(fee * 5));
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, MarketEvent::UrgentPriorityAlert { .. })));
    }

    #[test]
    fn test_demo_refuses_unfundable_fees() {
        let config = MarketConfig {
            standard_fee: Amount::new(u64::MAX / 8),
            premium_multiplier: 2,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(Script::demo(&config).is_err());

        let config = MarketConfig {
            standard_fee: Amount::new(u64::MAX / 16),
            premium_multiplier: 1,
            ..Default::default()
        };
        assert!(Script::demo(&config).is_ok());
    }

    #[tokio::test]
    async fn test_failed_steps_do_not_stop_the_run() {
        let script = Script {
            balances: BTreeMap::new(),
            steps: vec![
                Step::RequestStandard {
                    caller: AccountId::new("broke"),
                    prompt: "hello".to_string(),
                },
                Step::GetStats,
            ],
        };
        let report = script.run(MarketConfig::default()).await.unwrap();
        assert_eq!(report.outcomes[0].code(), Some("INSUFFICIENT_BALANCE"));
        assert!(report.outcomes[1].is_ok());
        assert!(report.events.is_empty());
    }

    fn config_fee() -> u64 {
        MarketConfig::default().standard_fee.value()
    }
}
