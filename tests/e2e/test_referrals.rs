use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;
use tokengate_backend::domain::referral::ReferralStatus;

async fn referral_code(ctx: &TestContext, token: &str) -> String {
    let response = ctx
        .client
        .post_empty_with_auth("/api/referrals", token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    response
        .body
        .as_ref()
        .and_then(|b| b.get("code"))
        .and_then(|c| c.as_str())
        .unwrap()
        .to_string()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_same_code_on_repeat_requests(ctx: &TestContext) {
    let alice = ctx.fixtures.create_account("alice@example.com");
    let token = ctx.token_for(alice.id);

    let first = referral_code(ctx, &token).await;
    let second = referral_code(ctx, &token).await;

    assert_eq!(first, second);
    assert_eq!(first.len(), 8);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reward_both_sides_on_redemption(ctx: &TestContext) {
    let alice = ctx.fixtures.create_account("alice@example.com");
    let bob = ctx.fixtures.create_account("bob@example.com");
    let code = referral_code(ctx, &ctx.token_for(alice.id)).await;

    let response = ctx
        .client
        .post_with_auth("/api/referrals/redeem", &json!({ "code": code }), &ctx.token_for(bob.id))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("redeemed"));

    assert_eq!(ctx.fixtures.balance(alice.id), 10);
    assert_eq!(ctx.fixtures.balance(bob.id), 5);

    let referral = ctx.store.referral(&code).unwrap();
    assert_eq!(referral.status, ReferralStatus::Completed);
    assert_eq!(referral.referred_user_id, Some(bob.id));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_second_redemption_by_same_user(ctx: &TestContext) {
    let alice = ctx.fixtures.create_account("alice@example.com");
    let carol = ctx.fixtures.create_account("carol@example.com");
    let bob = ctx.fixtures.create_account("bob@example.com");
    let alice_code = referral_code(ctx, &ctx.token_for(alice.id)).await;
    let carol_code = referral_code(ctx, &ctx.token_for(carol.id)).await;
    let bob_token = ctx.token_for(bob.id);

    ctx.client
        .post_with_auth("/api/referrals/redeem", &json!({ "code": alice_code }), &bob_token)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .post_with_auth("/api/referrals/redeem", &json!({ "code": carol_code }), &bob_token)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::CONFLICT)
        .assert_error_message("You have already used a referral code");
    assert_eq!(ctx.fixtures.balance(carol.id), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_code_already_used_by_someone_else(ctx: &TestContext) {
    let alice = ctx.fixtures.create_account("alice@example.com");
    let bob = ctx.fixtures.create_account("bob@example.com");
    let dave = ctx.fixtures.create_account("dave@example.com");
    let code = referral_code(ctx, &ctx.token_for(alice.id)).await;

    ctx.client
        .post_with_auth("/api/referrals/redeem", &json!({ "code": code }), &ctx.token_for(bob.id))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx
        .client
        .post_with_auth("/api/referrals/redeem", &json!({ "code": code }), &ctx.token_for(dave.id))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::CONFLICT)
        .assert_error_message("This referral code has already been used");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_own_code(ctx: &TestContext) {
    let alice = ctx.fixtures.create_account("alice@example.com");
    let token = ctx.token_for(alice.id);
    let code = referral_code(ctx, &token).await;

    let response = ctx
        .client
        .post_with_auth("/api/referrals/redeem", &json!({ "code": code }), &token)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("You cannot use your own referral code");
    assert_eq!(ctx.fixtures.balance(alice.id), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_code(ctx: &TestContext) {
    let bob = ctx.fixtures.create_account("bob@example.com");

    let response = ctx
        .client
        .post_with_auth(
            "/api/referrals/redeem",
            &json!({ "code": "ZZZZ9999" }),
            &ctx.token_for(bob.id),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Invalid referral code");
}
