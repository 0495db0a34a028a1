//! AskMarket Ledger - Payment rail for marketplace fees
//!
//! The marketplace treats token transfer as an external collaborator that
//! either succeeds atomically or fails. [`PaymentRail`] is that seam;
//! [`Ledger`] is the in-memory implementation used by the CLI and tests.
//!
//! The ledger is:
//! - Account-keyed by AccountId
//! - Double-entry (every credit has a corresponding debit)
//! - Append-only (entries are never rewritten)
//!
//! # Invariants
//!
//! 1. No negative balances
//! 2. Every entry has a reason
//! 3. A transfer writes both sides or neither

use std::collections::HashMap;
use std::sync::Arc;

use askmarket_types::{AccountId, Amount, RequestId, RequestKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors that can occur in ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance in {account}: have {available}, need {required}")]
    InsufficientBalance {
        account: AccountId,
        available: u64,
        required: u64,
    },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Invalid transfer: {message}")]
    InvalidTransfer { message: String },

    #[error("Payment rail unavailable: {message}")]
    Unavailable { message: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Unique identifier for a ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new() -> Self {
        Self(format!("entry_{}", Uuid::new_v4()))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    /// Credit (increase) to an account
    Credit,
    /// Debit (decrease) from an account
    Debit,
}

/// Reason for a ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryReason {
    /// External deposit into an account
    Deposit { reference: String },
    /// Request fee moved into custody
    RequestFee { request_id: RequestId, kind: RequestKind },
    /// Custodied fees moved to the administrator
    FeeWithdrawal,
    /// Any other account-to-account transfer
    Transfer { reference: String },
}

impl EntryReason {
    /// Correlation key shared by both sides of a transfer
    pub fn correlation_id(&self) -> String {
        match self {
            EntryReason::Deposit { reference } => format!("deposit:{}", reference),
            EntryReason::RequestFee { request_id, .. } => format!("fee:{}", request_id),
            EntryReason::FeeWithdrawal => "withdrawal".to_string(),
            EntryReason::Transfer { reference } => format!("transfer:{}", reference),
        }
    }
}

/// A single ledger entry (one side of a double-entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub account: AccountId,
    pub entry_type: EntryType,
    pub amount: Amount,
    pub balance_after: Amount,
    pub reason: EntryReason,
    pub correlation_id: String,
    pub created_at: DateTime<Utc>,
}

/// Account state in the ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: Amount,
    pub entry_count: u64,
}

/// Result of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub debit_entry: EntryId,
    pub credit_entry: EntryId,
    pub amount: Amount,
}

/// Atomic debit/credit primitive consumed by the marketplace
///
/// A transfer either moves the whole amount or fails with no effect.
#[async_trait::async_trait]
pub trait PaymentRail: Send + Sync {
    /// Move `amount` from `from` to `to`
    async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
        reason: EntryReason,
    ) -> Result<TransferReceipt>;

    /// Current balance of an account; unknown accounts hold zero
    async fn balance(&self, account: &AccountId) -> Amount;
}

#[derive(Debug, Default)]
struct LedgerInner {
    accounts: HashMap<AccountId, AccountState>,
    entries: Vec<LedgerEntry>,
}

impl LedgerInner {
    fn balance(&self, account: &AccountId) -> Amount {
        self.accounts
            .get(account)
            .map(|a| a.balance)
            .unwrap_or(Amount::zero())
    }

    fn push_entry(
        &mut self,
        account: &AccountId,
        entry_type: EntryType,
        amount: Amount,
        balance_after: Amount,
        reason: &EntryReason,
    ) -> EntryId {
        let state = self.accounts.entry(account.clone()).or_default();
        state.balance = balance_after;
        state.entry_count += 1;

        let entry = LedgerEntry {
            entry_id: EntryId::new(),
            account: account.clone(),
            entry_type,
            amount,
            balance_after,
            reason: reason.clone(),
            correlation_id: reason.correlation_id(),
            created_at: Utc::now(),
        };
        let entry_id = entry.entry_id.clone();
        self.entries.push(entry);
        entry_id
    }
}

/// The AskMarket Ledger
///
/// Thread-safe and designed for concurrent access. Cloning shares the
/// same underlying books.
#[derive(Clone, Default)]
pub struct Ledger {
    inner: Arc<RwLock<LedgerInner>>,
}

impl Ledger {
    /// Create a new in-memory ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger with opening balances
    pub async fn with_balances<I>(balances: I) -> Result<Self>
    where
        I: IntoIterator<Item = (AccountId, Amount)>,
    {
        let ledger = Self::new();
        for (account, amount) in balances {
            if amount.is_zero() {
                continue;
            }
            ledger.deposit(&account, amount, "opening balance").await?;
        }
        Ok(ledger)
    }

    /// Credit an account from outside the ledger
    ///
    /// Returns the new balance.
    pub async fn deposit(
        &self,
        account: &AccountId,
        amount: Amount,
        reference: impl Into<String>,
    ) -> Result<Amount> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount {
                message: "Amount must be greater than zero".to_string(),
            });
        }

        let mut inner = self.inner.write().await;
        let new_balance = inner
            .balance(account)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::InvalidAmount {
                message: "Balance overflow".to_string(),
            })?;

        let reason = EntryReason::Deposit {
            reference: reference.into(),
        };
        inner.push_entry(account, EntryType::Credit, amount, new_balance, &reason);
        tracing::debug!(account = %account, amount = amount.0, "deposit recorded");

        Ok(new_balance)
    }

    /// Get all entries for an account
    pub async fn account_entries(&self, account: &AccountId) -> Vec<LedgerEntry> {
        let inner = self.inner.read().await;
        inner
            .entries
            .iter()
            .filter(|e| &e.account == account)
            .cloned()
            .collect()
    }

    /// Get both sides of every transfer sharing a correlation id
    pub async fn correlated_entries(&self, correlation_id: &str) -> Vec<LedgerEntry> {
        let inner = self.inner.read().await;
        inner
            .entries
            .iter()
            .filter(|e| e.correlation_id == correlation_id)
            .cloned()
            .collect()
    }

    /// Get the total number of entries
    pub async fn entry_count(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Get recent entries (newest first)
    pub async fn recent_entries(&self, limit: usize) -> Vec<LedgerEntry> {
        let inner = self.inner.read().await;
        inner.entries.iter().rev().take(limit).cloned().collect()
    }

    /// Get account state
    pub async fn account_state(&self, account: &AccountId) -> Option<AccountState> {
        let inner = self.inner.read().await;
        inner.accounts.get(account).cloned()
    }

    /// Sum of all balances; only deposits change it
    ///
    /// `None` when the sum does not fit in an `Amount`.
    pub async fn total_balance(&self) -> Option<Amount> {
        let inner = self.inner.read().await;
        inner
            .accounts
            .values()
            .try_fold(Amount::zero(), |total, account| total.checked_add(account.balance))
    }
}

#[async_trait::async_trait]
impl PaymentRail for Ledger {
    async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
        reason: EntryReason,
    ) -> Result<TransferReceipt> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount {
                message: "Amount must be greater than zero".to_string(),
            });
        }
        if from == to {
            return Err(LedgerError::InvalidTransfer {
                message: format!("{} cannot transfer to itself", from),
            });
        }

        // One write guard for both sides: the debit and credit land together.
        let mut inner = self.inner.write().await;

        let from_balance = inner.balance(from);
        let from_after =
            from_balance
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::InsufficientBalance {
                    account: from.clone(),
                    available: from_balance.0,
                    required: amount.0,
                })?;
        let to_after = inner
            .balance(to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::InvalidAmount {
                message: "Balance overflow".to_string(),
            })?;

        let debit_entry = inner.push_entry(from, EntryType::Debit, amount, from_after, &reason);
        let credit_entry = inner.push_entry(to, EntryType::Credit, amount, to_after, &reason);

        tracing::debug!(
            from = %from,
            to = %to,
            amount = amount.0,
            correlation = %reason.correlation_id(),
            "transfer recorded"
        );

        Ok(TransferReceipt {
            debit_entry,
            credit_entry,
            amount,
        })
    }

    async fn balance(&self, account: &AccountId) -> Amount {
        self.inner.read().await.balance(account)
    }
}
