//! The Marketplace Ledger
//!
//! One component owning all marketplace state. Every mutating operation
//! runs as a single transaction behind one mutex:
//!
//! ```text
//! lock ─→ validate everything ─→ payment rail transfer ─→ infallible writes ─→ publish events ─→ unlock
//!                 │                        │
//!                 └── Err: nothing changed └── Err: nothing changed
//! ```
//!
//! Nothing after the transfer can fail, so a caller is never charged for a
//! request that was not recorded. Events are buffered while the operation
//! runs and published only once it has committed.

use std::sync::Arc;

use askmarket_ledger::{Ledger, LedgerError, PaymentRail};
use askmarket_types::{AccountId, MarketError, MarketEvent, MarketStats, Result};
use tokio::sync::{broadcast, Mutex};

use crate::clock::{BlockClock, Clock};
use crate::config::MarketConfig;
use crate::controller::ControllerState;
use crate::events::EventBus;
use crate::lifecycle::RequestBook;
use crate::rating::RatingLedger;
use crate::registry::AuthorizationRegistry;

/// All mutable marketplace state, guarded as one unit
#[derive(Debug, Default)]
pub(crate) struct MarketState {
    pub(crate) registry: AuthorizationRegistry,
    pub(crate) controller: ControllerState,
    pub(crate) book: RequestBook,
    pub(crate) ratings: RatingLedger,
}

/// Value of a successful operation plus the events it produced
pub(crate) struct Committed<T> {
    pub(crate) value: T,
    pub(crate) events: Vec<MarketEvent>,
}

impl<T> Committed<T> {
    pub(crate) fn new(value: T, events: Vec<MarketEvent>) -> Self {
        Self { value, events }
    }
}

/// The AskMarket marketplace
///
/// Share it between tasks with `Arc<Marketplace>`; every operation takes
/// `&self`.
pub struct Marketplace {
    pub(crate) config: MarketConfig,
    pub(crate) state: Mutex<MarketState>,
    pub(crate) rail: Arc<dyn PaymentRail>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) events: EventBus,
}

impl Marketplace {
    /// Create a marketplace over the given collaborators
    pub fn new(
        config: MarketConfig,
        rail: Arc<dyn PaymentRail>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let events = EventBus::new(config.event_channel_capacity, config.event_journal_capacity);

        tracing::info!(
            admin = %config.admin,
            custody = %config.custody_account,
            standard_fee = config.standard_fee.0,
            "marketplace initialized"
        );

        Ok(Self {
            config,
            state: Mutex::new(MarketState::default()),
            rail,
            clock,
            events,
        })
    }

    /// Create a marketplace over an in-memory ledger with a block clock
    pub fn with_ledger(config: MarketConfig, ledger: Ledger) -> Result<Self> {
        Self::new(config, Arc::new(ledger), Arc::new(BlockClock::new()))
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// The administrator fixed at construction
    pub fn admin(&self) -> &AccountId {
        &self.config.admin
    }

    /// Notification journal and channel
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to notifications published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.events.subscribe()
    }

    /// Read-only counters
    pub async fn get_stats(&self) -> MarketStats {
        let state = self.state.lock().await;
        MarketStats {
            total_requests: state.book.total_requests(),
            total_fees_collected: state.controller.total_fees_collected,
            paused: state.controller.paused,
        }
    }

    pub(crate) fn ensure_admin(&self, caller: &AccountId, action: &str) -> Result<()> {
        if caller != &self.config.admin {
            return Err(MarketError::not_authorized(caller, action));
        }
        Ok(())
    }

    /// Publish a committed operation's events, or log its rejection
    ///
    /// Callers keep the state guard alive across this call so events are
    /// published in commit order. Publishing never suspends, so an operation
    /// that committed always has its notifications journaled.
    pub(crate) fn settle<T>(
        &self,
        operation: &'static str,
        caller: &AccountId,
        outcome: Result<Committed<T>>,
    ) -> Result<T> {
        match outcome {
            Ok(committed) => {
                self.events.publish(committed.events);
                Ok(committed.value)
            }
            Err(err) => {
                tracing::warn!(
                    operation,
                    caller = %caller,
                    code = err.error_code(),
                    error = %err,
                    "operation rejected"
                );
                Err(err)
            }
        }
    }
}

/// Reject text longer than `max` characters
pub(crate) fn check_len(field: &str, text: &str, max: usize) -> Result<()> {
    let actual = text.chars().count();
    if actual > max {
        return Err(MarketError::TextTooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }
    Ok(())
}

/// Translate a payment rail failure into the marketplace taxonomy
pub(crate) fn payment_error(err: LedgerError) -> MarketError {
    match err {
        LedgerError::InsufficientBalance {
            account,
            available,
            required,
        } => MarketError::InsufficientBalance {
            account,
            required,
            available,
        },
        LedgerError::InvalidAmount { message } => MarketError::InvalidAmount { reason: message },
        LedgerError::InvalidTransfer { message } => MarketError::Payment {
            message,
            retriable: false,
        },
        LedgerError::Unavailable { message } => MarketError::Payment {
            message,
            retriable: true,
        },
    }
}
