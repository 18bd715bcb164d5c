use crate::e2e::helpers;

use chrono::{Duration, Utc};
use helpers::assertions::{assert_granted, assert_status_tag};
use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_grant_daily_reward_once_per_day(ctx: &TestContext) {
    let account = ctx.fixtures.create_account("daily@example.com");
    let token = ctx.token_for(account.id);

    let response = ctx
        .client
        .post_empty_with_auth("/api/rewards/daily", &token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_granted(response.body.as_ref().unwrap(), 5, 5);

    let response = ctx
        .client
        .post_empty_with_auth("/api/rewards/daily", &token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_status_tag(body, "already_claimed");
    assert_eq!(body.get("hours_remaining").and_then(|v| v.as_i64()), Some(24));

    assert_eq!(ctx.fixtures.balance(account.id), 5);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_grant_daily_reward_after_cooldown(ctx: &TestContext) {
    let account = ctx.fixtures.create_account_with("yesterday@example.com", |a| {
        a.last_daily_reward_at = Some(Utc::now() - Duration::hours(30));
    });
    let token = ctx.token_for(account.id);

    let response = ctx
        .client
        .post_empty_with_auth("/api/rewards/daily", &token)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_granted(response.body.as_ref().unwrap(), 5, 5);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_grant_rating_reward_only_once(ctx: &TestContext) {
    let account = ctx.fixtures.create_account("rater@example.com");
    let token = ctx.token_for(account.id);

    let response = ctx
        .client
        .post_empty_with_auth("/api/rewards/rating", &token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_granted(response.body.as_ref().unwrap(), 5, 5);

    let response = ctx
        .client
        .post_empty_with_auth("/api/rewards/rating", &token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_status_tag(response.body.as_ref().unwrap(), "already_rated");

    assert_eq!(ctx.fixtures.balance(account.id), 5);
    assert!(ctx.store.account(account.id).unwrap().has_rated_app);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_grant_a_token_per_ad_watched(ctx: &TestContext) {
    let account = ctx.fixtures.create_account("viewer@example.com");
    let token = ctx.token_for(account.id);

    for expected_balance in 1..=3 {
        let response = ctx
            .client
            .post_empty_with_auth("/api/rewards/ad", &token)
            .await
            .unwrap();
        response.assert_status(StatusCode::OK);
        assert_granted(response.body.as_ref().unwrap(), 1, expected_balance);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_reward_premium_accounts(ctx: &TestContext) {
    let account = ctx.fixtures.create_premium_account("vip@example.com");
    let token = ctx.token_for(account.id);

    for path in ["/api/rewards/daily", "/api/rewards/rating", "/api/rewards/ad"] {
        let response = ctx.client.post_empty_with_auth(path, &token).await.unwrap();
        response.assert_status(StatusCode::OK);
        assert_status_tag(response.body.as_ref().unwrap(), "no_op");
    }

    assert_eq!(ctx.fixtures.balance(account.id), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_auth_for_rewards(ctx: &TestContext) {
    let response = ctx.client.post("/api/rewards/ad", &json!({})).await.unwrap();

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_record_rewards_in_history_newest_first(ctx: &TestContext) {
    let account = ctx.fixtures.create_account("ledger@example.com");
    let token = ctx.token_for(account.id);

    ctx.client
        .post_empty_with_auth("/api/rewards/daily", &token)
        .await
        .unwrap();
    ctx.client
        .post_empty_with_auth("/api/rewards/ad", &token)
        .await
        .unwrap();

    let response = ctx
        .client
        .get_with_auth("/api/tokens/transactions?limit=10", &token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let history = response.body.as_ref().unwrap().as_array().unwrap().clone();
    let amounts: Vec<i64> = history
        .iter()
        .filter_map(|tx| tx.get("amount").and_then(|v| v.as_i64()))
        .collect();
    assert_eq!(amounts, vec![1, 5]);
    assert!(history
        .iter()
        .all(|tx| tx.get("transaction_type").and_then(|v| v.as_str()) == Some("reward")));
}
