//! Shared fixtures for marketplace integration tests

#![allow(dead_code)]

use std::sync::Arc;

use askmarket_core::{AccountId, Amount, Ledger, MarketConfig, Marketplace};

pub const STANDARD_FEE: u64 = 1_000_000;
pub const PREMIUM_FEE: u64 = 5_000_000;

pub fn admin() -> AccountId {
    AccountId::new("admin")
}

pub fn alice() -> AccountId {
    AccountId::new("alice")
}

pub fn bob() -> AccountId {
    AccountId::new("bob")
}

pub fn bot_a() -> AccountId {
    AccountId::new("bot-a")
}

pub fn bot_b() -> AccountId {
    AccountId::new("bot-b")
}

pub struct Fixture {
    pub market: Arc<Marketplace>,
    pub ledger: Ledger,
}

/// Marketplace where alice and bob each hold `balance` units
pub async fn fixture_with_balance(balance: u64) -> Fixture {
    let ledger = Ledger::with_balances([
        (alice(), Amount::new(balance)),
        (bob(), Amount::new(balance)),
    ])
    .await
    .unwrap();
    let market = Marketplace::with_ledger(MarketConfig::with_admin(admin()), ledger.clone()).unwrap();
    Fixture {
        market: Arc::new(market),
        ledger,
    }
}

/// Marketplace with funded users and both bots authorized
pub async fn fixture() -> Fixture {
    let fx = fixture_with_balance(100 * STANDARD_FEE).await;
    fx.market.authorize(&admin(), &bot_a()).await.unwrap();
    fx.market.authorize(&admin(), &bot_b()).await.unwrap();
    fx
}
