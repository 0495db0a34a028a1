//! Administrator, circuit breaker and fee custody tests

mod common;

use askmarket_core::{
    AccountId, Amount, MarketError, MarketEvent, PaymentRail, PremiumRequest, RequestId,
    RequestStatus,
};
use common::*;

#[tokio::test]
async fn test_non_admin_cannot_change_registry() {
    let fx = fixture_with_balance(10 * STANDARD_FEE).await;

    let result = fx.market.authorize(&alice(), &bot_a()).await;
    assert!(matches!(result, Err(MarketError::NotAuthorized { .. })));
    assert!(!fx.market.is_authorized(&bot_a()).await);

    fx.market.authorize(&admin(), &bot_a()).await.unwrap();
    let result = fx.market.revoke(&bot_a(), &bot_a()).await;
    assert!(matches!(result, Err(MarketError::NotAuthorized { .. })));
    assert!(fx.market.is_authorized(&bot_a()).await);
}

#[tokio::test]
async fn test_authorization_is_idempotent() {
    let fx = fixture_with_balance(0).await;

    fx.market.authorize(&admin(), &bot_a()).await.unwrap();
    fx.market.authorize(&admin(), &bot_a()).await.unwrap();
    assert_eq!(fx.market.authorized_responders().await, vec![bot_a()]);

    fx.market.revoke(&admin(), &bot_a()).await.unwrap();
    fx.market.revoke(&admin(), &bot_a()).await.unwrap();
    assert!(fx.market.authorized_responders().await.is_empty());

    // Revoking an identity never seen is accepted too
    fx.market.revoke(&admin(), &AccountId::new("ghost")).await.unwrap();
    assert!(!fx.market.is_authorized(&AccountId::new("ghost")).await);
}

#[tokio::test]
async fn test_pause_blocks_writes_not_reads() {
    let fx = fixture().await;
    let id = fx.market.request_standard(&alice(), "before pause").await.unwrap();

    fx.market.set_paused(&admin(), true).await.unwrap();
    assert!(fx.market.is_paused().await);
    assert!(fx.market.get_stats().await.paused);

    assert_eq!(
        fx.market.request_standard(&alice(), "hello").await,
        Err(MarketError::Paused)
    );
    assert_eq!(
        fx.market
            .request_premium(&alice(), PremiumRequest::new("p", "ctx", 3))
            .await,
        Err(MarketError::Paused)
    );
    assert_eq!(
        fx.market.provide_response(&bot_a(), id, "hi").await,
        Err(MarketError::Paused)
    );

    // Reads keep working
    assert_eq!(fx.market.get_request(id).await.unwrap().status, RequestStatus::Pending);
    assert!(fx.market.is_authorized(&bot_a()).await);
    assert_eq!(fx.market.get_stats().await.total_requests, 1);

    fx.market.set_paused(&admin(), false).await.unwrap();
    assert!(fx.market.provide_response(&bot_a(), id, "hi").await.unwrap());
}

#[tokio::test]
async fn test_paused_request_is_not_charged() {
    let fx = fixture().await;
    let before = fx.ledger.balance(&alice()).await;

    fx.market.set_paused(&admin(), true).await.unwrap();
    let _ = fx.market.request_standard(&alice(), "hello").await;

    assert_eq!(fx.ledger.balance(&alice()).await, before);
    assert_eq!(fx.market.custody_balance().await, Amount::zero());
}

#[tokio::test]
async fn test_pause_is_idempotent_and_admin_only() {
    let fx = fixture_with_balance(0).await;

    assert!(matches!(
        fx.market.set_paused(&alice(), true).await,
        Err(MarketError::NotAuthorized { .. })
    ));
    assert!(!fx.market.is_paused().await);

    fx.market.set_paused(&admin(), true).await.unwrap();
    fx.market.set_paused(&admin(), true).await.unwrap();
    assert!(fx.market.is_paused().await);

    fx.market.set_paused(&admin(), false).await.unwrap();
    fx.market.set_paused(&admin(), false).await.unwrap();
    assert!(!fx.market.is_paused().await);
}

#[tokio::test]
async fn test_rating_allowed_while_paused() {
    let fx = fixture().await;
    let id = fx.market.request_standard(&alice(), "hello").await.unwrap();
    fx.market.provide_response(&bot_a(), id, "hi").await.unwrap();

    fx.market.set_paused(&admin(), true).await.unwrap();
    assert!(fx.market.rate_response(&alice(), id, 3, None).await.unwrap());
}

#[tokio::test]
async fn test_withdraw_moves_custody_not_accumulator() {
    let fx = fixture().await;
    fx.market.request_standard(&alice(), "one").await.unwrap();
    fx.market
        .request_premium(&bob(), PremiumRequest::new("two", "ctx", 2))
        .await
        .unwrap();

    let collected = Amount::new(STANDARD_FEE + PREMIUM_FEE);
    assert_eq!(fx.market.custody_balance().await, collected);

    let withdrawn = fx
        .market
        .withdraw_fees(&admin(), Amount::new(STANDARD_FEE))
        .await
        .unwrap();
    assert_eq!(withdrawn, Amount::new(STANDARD_FEE));

    assert_eq!(fx.ledger.balance(&admin()).await, Amount::new(STANDARD_FEE));
    assert_eq!(fx.market.custody_balance().await, Amount::new(PREMIUM_FEE));
    assert_eq!(fx.market.get_stats().await.total_fees_collected, collected);

    let last = fx.market.events().recent(1);
    assert!(matches!(
        last.first(),
        Some(MarketEvent::FeesWithdrawn { amount, .. }) if *amount == Amount::new(STANDARD_FEE)
    ));
}

#[tokio::test]
async fn test_withdraw_more_than_custody_fails() {
    let fx = fixture().await;
    fx.market.request_standard(&alice(), "one").await.unwrap();

    let result = fx
        .market
        .withdraw_fees(&admin(), Amount::new(STANDARD_FEE + 1))
        .await;
    assert!(matches!(result, Err(MarketError::InsufficientBalance { .. })));
    assert_eq!(fx.market.custody_balance().await, Amount::new(STANDARD_FEE));
    assert_eq!(fx.ledger.balance(&admin()).await, Amount::zero());
}

#[tokio::test]
async fn test_withdraw_checks() {
    let fx = fixture().await;
    fx.market.request_standard(&alice(), "one").await.unwrap();

    assert!(matches!(
        fx.market.withdraw_fees(&alice(), Amount::new(1)).await,
        Err(MarketError::NotAuthorized { .. })
    ));
    assert!(matches!(
        fx.market.withdraw_fees(&admin(), Amount::zero()).await,
        Err(MarketError::InvalidAmount { .. })
    ));

    // Withdrawal stays available while paused
    fx.market.set_paused(&admin(), true).await.unwrap();
    assert!(fx.market.withdraw_fees(&admin(), Amount::new(1)).await.is_ok());
}

#[tokio::test]
async fn test_non_admin_withdrawal_changes_nothing() {
    let fx = fixture().await;
    fx.market.request_standard(&alice(), "one").await.unwrap();
    let journal_before = fx.market.events().journal();

    for caller in [alice(), bot_a(), AccountId::new("market-custody")] {
        assert!(matches!(
            fx.market.withdraw_fees(&caller, Amount::new(STANDARD_FEE)).await,
            Err(MarketError::NotAuthorized { .. })
        ));
    }

    assert_eq!(fx.market.custody_balance().await, Amount::new(STANDARD_FEE));
    assert_eq!(fx.ledger.balance(&admin()).await, Amount::zero());
    assert_eq!(
        fx.market.get_stats().await.total_fees_collected,
        Amount::new(STANDARD_FEE)
    );
    let journal_after = fx.market.events().journal();
    assert_eq!(journal_after, journal_before);
    assert!(!journal_after
        .iter()
        .any(|e| matches!(e, MarketEvent::FeesWithdrawn { .. })));
}

#[tokio::test]
async fn test_stranger_rating_open_request_is_not_requester() {
    let fx = fixture().await;
    let id = fx.market.request_standard(&alice(), "hello").await.unwrap();
    assert_eq!(fx.market.get_request(id).await.unwrap().status, RequestStatus::Pending);

    assert_eq!(
        fx.market.rate_response(&bob(), id, 4, None).await,
        Err(MarketError::NotRequester {
            caller: bob(),
            request_id: id
        })
    );
    assert!(fx.market.get_rating(id).await.is_none());
}

#[tokio::test]
async fn test_rating_checks() {
    let fx = fixture().await;
    let id = fx.market.request_standard(&alice(), "hello").await.unwrap();

    // Not ready before a response exists
    assert_eq!(
        fx.market.rate_response(&alice(), id, 5, None).await,
        Err(MarketError::RequestNotFound { request_id: id })
    );
    assert_eq!(
        fx.market.rate_response(&alice(), RequestId(99), 5, None).await,
        Err(MarketError::RequestNotFound {
            request_id: RequestId(99)
        })
    );

    fx.market.provide_response(&bot_a(), id, "hi").await.unwrap();

    for score in [0u8, 6] {
        assert_eq!(
            fx.market.rate_response(&alice(), id, score, None).await,
            Err(MarketError::InvalidRating {
                score,
                min: 1,
                max: 5
            })
        );
    }
    assert!(matches!(
        fx.market
            .rate_response(&alice(), id, 4, Some("c".repeat(201)))
            .await,
        Err(MarketError::TextTooLong { max: 200, .. })
    ));
    assert_eq!(fx.market.rating_count().await, 0);

    assert!(fx.market.rate_response(&alice(), id, 1, None).await.unwrap());
    assert_eq!(
        fx.market.rate_response(&alice(), id, 5, None).await,
        Err(MarketError::AlreadyRated { request_id: id })
    );
    assert_eq!(fx.market.get_rating(id).await.unwrap().score, 1);
}

#[tokio::test]
async fn test_top_score_accepted() {
    let fx = fixture().await;
    let id = fx.market.request_standard(&bob(), "hello").await.unwrap();
    fx.market.provide_response(&bot_b(), id, "hi").await.unwrap();
    assert!(fx
        .market
        .rate_response(&bob(), id, 5, Some(String::new()))
        .await
        .unwrap());
}
