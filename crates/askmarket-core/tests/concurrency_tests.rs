//! Concurrent callers against one shared marketplace

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use askmarket_core::{AccountId, Amount, MarketError, RequestId};
use common::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_exactly_one_claim_wins() {
    let fx = fixture().await;
    let bots: Vec<AccountId> = (0..16).map(|i| AccountId::new(format!("bot-{i}"))).collect();
    for bot in &bots {
        fx.market.authorize(&admin(), bot).await.unwrap();
    }

    let id = fx.market.request_standard(&alice(), "race").await.unwrap();

    let mut handles = Vec::new();
    for bot in bots.clone() {
        let market = Arc::clone(&fx.market);
        handles.push(tokio::spawn(async move {
            let result = market.provide_response(&bot, id, format!("answer from {bot}")).await;
            (bot, result)
        }));
    }

    let mut winners = Vec::new();
    let mut losers = 0;
    for handle in handles {
        let (bot, result) = handle.await.unwrap();
        match result {
            Ok(true) => winners.push(bot),
            Err(MarketError::AlreadyResponded { request_id }) => {
                assert_eq!(request_id, id);
                losers += 1;
            }
            other => panic!("Unexpected claim outcome: {:?}", other),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(losers, bots.len() - 1);

    let response = fx.market.get_response(id).await.unwrap();
    assert_eq!(response.responder, winners[0]);
    assert_eq!(response.text, format!("answer from {}", winners[0]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_get_unique_ids() {
    let fx = fixture().await;

    let mut handles = Vec::new();
    for i in 0..20u64 {
        let market = Arc::clone(&fx.market);
        let caller = if i % 2 == 0 { alice() } else { bob() };
        handles.push(tokio::spawn(async move {
            market.request_standard(&caller, format!("prompt {i}")).await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap());
    }

    let expected: HashSet<RequestId> = (0..20).map(RequestId).collect();
    assert_eq!(ids, expected);

    let stats = fx.market.get_stats().await;
    assert_eq!(stats.total_requests, 20);
    assert_eq!(stats.total_fees_collected, Amount::new(20 * STANDARD_FEE));
    assert_eq!(fx.market.custody_balance().await, Amount::new(20 * STANDARD_FEE));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_spending_never_overdraws() {
    // Enough for exactly three requests
    let fx = fixture_with_balance(3 * STANDARD_FEE).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let market = Arc::clone(&fx.market);
        handles.push(tokio::spawn(async move {
            market.request_standard(&alice(), format!("p{i}")).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(MarketError::InsufficientBalance { .. }) => {}
            Err(other) => panic!("Unexpected error: {other}"),
        }
    }

    assert_eq!(created, 3);
    assert_eq!(fx.market.get_stats().await.total_requests, 3);
    assert_eq!(
        askmarket_core::PaymentRail::balance(&fx.ledger, &alice()).await,
        Amount::zero()
    );
}
