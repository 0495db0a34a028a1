//! Marketplace configuration
//!
//! Fixed at construction. The administrator identity lives here and is
//! never reassigned for the lifetime of a marketplace.

use askmarket_types::{AccountId, Amount, MarketError, RatingBounds, Result};
use serde::{Deserialize, Serialize};

/// Marketplace configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Sole identity allowed to run administrative operations
    #[serde(default = "default_admin")]
    pub admin: AccountId,

    /// Account holding collected fees on the payment rail
    #[serde(default = "default_custody")]
    pub custody_account: AccountId,

    /// Fee for a standard request, in smallest units
    #[serde(default = "default_standard_fee")]
    pub standard_fee: Amount,

    /// Premium fee = standard fee × multiplier
    #[serde(default = "default_premium_multiplier")]
    pub premium_multiplier: u64,

    /// Lowest accepted premium priority
    #[serde(default = "default_min_priority")]
    pub min_priority: u8,

    /// Highest accepted premium priority
    #[serde(default = "default_max_priority")]
    pub max_priority: u8,

    /// Priorities strictly above this raise an urgent alert
    #[serde(default = "default_urgent_priority_threshold")]
    pub urgent_priority_threshold: u8,

    /// Lowest accepted rating score
    #[serde(default = "default_min_rating")]
    pub min_rating: u8,

    /// Highest accepted rating score
    #[serde(default = "default_max_rating")]
    pub max_rating: u8,

    /// Maximum prompt length in characters
    #[serde(default = "default_max_prompt_len")]
    pub max_prompt_len: usize,

    /// Maximum premium context length in characters
    #[serde(default = "default_max_context_len")]
    pub max_context_len: usize,

    /// Maximum response length in characters
    #[serde(default = "default_max_response_len")]
    pub max_response_len: usize,

    /// Maximum rating comment length in characters
    #[serde(default = "default_max_comment_len")]
    pub max_comment_len: usize,

    /// Events retained for polling
    #[serde(default = "default_event_journal_capacity")]
    pub event_journal_capacity: usize,

    /// Buffer of the live event channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            admin: default_admin(),
            custody_account: default_custody(),
            standard_fee: default_standard_fee(),
            premium_multiplier: default_premium_multiplier(),
            min_priority: default_min_priority(),
            max_priority: default_max_priority(),
            urgent_priority_threshold: default_urgent_priority_threshold(),
            min_rating: default_min_rating(),
            max_rating: default_max_rating(),
            max_prompt_len: default_max_prompt_len(),
            max_context_len: default_max_context_len(),
            max_response_len: default_max_response_len(),
            max_comment_len: default_max_comment_len(),
            event_journal_capacity: default_event_journal_capacity(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl MarketConfig {
    /// Default configuration with a specific administrator
    pub fn with_admin(admin: impl Into<AccountId>) -> Self {
        Self {
            admin: admin.into(),
            ..Default::default()
        }
    }

    /// Fee charged for a premium request
    pub fn premium_fee(&self) -> Result<Amount> {
        self.standard_fee
            .checked_mul(self.premium_multiplier)
            .ok_or_else(|| MarketError::invalid_config("premium fee overflows"))
    }

    pub fn rating_bounds(&self) -> RatingBounds {
        RatingBounds::new(self.min_rating, self.max_rating)
    }

    pub fn priority_in_range(&self, priority: u8) -> bool {
        (self.min_priority..=self.max_priority).contains(&priority)
    }

    pub fn is_urgent(&self, priority: u8) -> bool {
        priority > self.urgent_priority_threshold
    }

    /// Reject inconsistent settings
    pub fn validate(&self) -> Result<()> {
        if self.admin == self.custody_account {
            return Err(MarketError::invalid_config(
                "custody account must differ from the administrator",
            ));
        }
        if self.standard_fee.is_zero() {
            return Err(MarketError::invalid_config("standard fee must be greater than zero"));
        }
        if self.premium_multiplier == 0 {
            return Err(MarketError::invalid_config("premium multiplier must be at least 1"));
        }
        self.premium_fee()?;
        if self.min_priority == 0 || self.min_priority > self.max_priority {
            return Err(MarketError::invalid_config(format!(
                "priority range [{}, {}] is empty or starts at zero",
                self.min_priority, self.max_priority
            )));
        }
        if self.min_rating > self.max_rating {
            return Err(MarketError::invalid_config(format!(
                "rating range [{}, {}] is empty",
                self.min_rating, self.max_rating
            )));
        }
        if self.max_prompt_len == 0 || self.max_response_len == 0 {
            return Err(MarketError::invalid_config(
                "prompt and response limits must be greater than zero",
            ));
        }
        if self.event_journal_capacity == 0 || self.event_channel_capacity == 0 {
            return Err(MarketError::invalid_config("event capacities must be greater than zero"));
        }
        Ok(())
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_admin() -> AccountId {
    AccountId::new("admin")
}

fn default_custody() -> AccountId {
    AccountId::new("market-custody")
}

fn default_standard_fee() -> Amount {
    Amount::new(1_000_000)
}

fn default_premium_multiplier() -> u64 {
    5
}

fn default_min_priority() -> u8 {
    1
}

fn default_max_priority() -> u8 {
    10
}

fn default_urgent_priority_threshold() -> u8 {
    8
}

fn default_min_rating() -> u8 {
    1
}

fn default_max_rating() -> u8 {
    5
}

fn default_max_prompt_len() -> usize {
    500
}

fn default_max_context_len() -> usize {
    1000
}

fn default_max_response_len() -> usize {
    2000
}

fn default_max_comment_len() -> usize {
    200
}

fn default_event_journal_capacity() -> usize {
    1000
}

fn default_event_channel_capacity() -> usize {
    256
}
