//! AskMarket Core - The marketplace ledger
//!
//! Users pay a fixed fee to post a prompt; exactly one whitelisted
//! responder agent claims and answers it; the requester may rate the answer
//! once. Four sub-models share one state store:
//!
//! - Authorization Registry: responder whitelist
//! - Fee & Pause Controller: circuit breaker and fee custody
//! - Request Lifecycle: creation, claiming and completion
//! - Rating Ledger: post-completion feedback
//!
//! # Invariants
//!
//! 1. Every operation commits fully or leaves no trace
//! 2. A request is never charged for without being recorded
//! 3. At most one response per request; the first claim wins
//! 4. Status only moves forward, to `Completed`
//! 5. A rating exists only for a completed request, from its requester
//! 6. Only the administrator fixed at construction runs admin operations
//!
//! # Example
//!
//! ```ignore
//! let ledger = Ledger::with_balances([(alice.clone(), Amount::new(10_000_000))]).await?;
//! let market = Marketplace::with_ledger(MarketConfig::with_admin("admin"), ledger)?;
//!
//! market.authorize(market.admin(), &bot).await?;
//! let id = market.request_standard(&alice, "hello").await?;
//! market.provide_response(&bot, id, "hi").await?;
//! market.rate_response(&alice, id, 5, Some("great".into())).await?;
//! ```

pub mod clock;
pub mod config;
pub mod events;
pub mod integrity;
pub mod market;

mod controller;
mod lifecycle;
mod rating;
mod registry;

pub use clock::{BlockClock, Clock, WallClock};
pub use config::MarketConfig;
pub use events::EventBus;
pub use integrity::integrity_tag;
pub use lifecycle::PremiumRequest;
pub use market::Marketplace;

pub use askmarket_ledger::{Ledger, LedgerError, PaymentRail};
pub use askmarket_types::*;
