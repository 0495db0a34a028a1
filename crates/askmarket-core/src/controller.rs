//! Fee & Pause Controller
//!
//! Administrator toggles and fee custody. Collected fees sit in the
//! custody account on the payment rail; the running total kept here is
//! informational lifetime volume and is never decremented.

use askmarket_ledger::EntryReason;
use askmarket_types::{AccountId, Amount, MarketError, MarketEvent, Result};

use crate::market::{payment_error, Committed, Marketplace};

/// Circuit breaker and fee accumulator
#[derive(Debug, Default)]
pub(crate) struct ControllerState {
    pub(crate) paused: bool,
    pub(crate) total_fees_collected: Amount,
}

impl ControllerState {
    pub(crate) fn ensure_running(&self) -> Result<()> {
        if self.paused {
            return Err(MarketError::Paused);
        }
        Ok(())
    }

    /// Accumulator value after adding `fee`, checked before any payment
    pub(crate) fn total_after(&self, fee: Amount) -> Result<Amount> {
        self.total_fees_collected
            .checked_add(fee)
            .ok_or(MarketError::CounterOverflow)
    }
}

impl Marketplace {
    /// Engage or release the circuit breaker (administrator only, idempotent)
    pub async fn set_paused(&self, caller: &AccountId, paused: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        let outcome = self.apply_pause(&mut state.controller, caller, paused);
        self.settle("set_paused", caller, outcome)
    }

    /// Move custodied fees to the administrator (administrator only)
    ///
    /// Allowed while paused. Returns the amount withdrawn.
    pub async fn withdraw_fees(&self, caller: &AccountId, amount: Amount) -> Result<Amount> {
        // Serialize with every other operation even though no marketplace
        // record changes.
        let _state = self.state.lock().await;
        let outcome = self.transfer_to_admin(caller, amount).await;
        self.settle("withdraw_fees", caller, outcome)
    }

    /// Balance the custody account holds on the payment rail
    pub async fn custody_balance(&self) -> Amount {
        self.rail.balance(&self.config.custody_account).await
    }

    pub async fn is_paused(&self) -> bool {
        self.state.lock().await.controller.paused
    }

    fn apply_pause(
        &self,
        controller: &mut ControllerState,
        caller: &AccountId,
        paused: bool,
    ) -> Result<Committed<()>> {
        self.ensure_admin(caller, "pause the marketplace")?;

        controller.paused = paused;
        let timestamp = self.clock.now();
        tracing::info!(paused, "circuit breaker set");

        Ok(Committed::new(
            (),
            vec![MarketEvent::PauseChanged { paused, timestamp }],
        ))
    }

    async fn transfer_to_admin(&self, caller: &AccountId, amount: Amount) -> Result<Committed<Amount>> {
        self.ensure_admin(caller, "withdraw fees")?;
        if amount.is_zero() {
            return Err(MarketError::InvalidAmount {
                reason: "withdrawal must be greater than zero".to_string(),
            });
        }

        self.rail
            .transfer(
                &self.config.custody_account,
                &self.config.admin,
                amount,
                EntryReason::FeeWithdrawal,
            )
            .await
            .map_err(payment_error)?;

        let timestamp = self.clock.now();
        tracing::info!(amount = amount.0, recipient = %self.config.admin, "fees withdrawn");

        Ok(Committed::new(
            amount,
            vec![MarketEvent::FeesWithdrawn {
                amount,
                recipient: self.config.admin.clone(),
                timestamp,
            }],
        ))
    }
}
