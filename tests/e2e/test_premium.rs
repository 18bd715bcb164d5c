use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use test_context::test_context;
use tokengate_backend::domain::account::PremiumTier;
use tokengate_backend::domain::entitlement::Entitlement;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_free_account_as_not_premium(ctx: &TestContext) {
    let account = ctx.fixtures.create_account("free@example.com");

    let response = ctx
        .client
        .get_with_auth("/api/premium", &ctx.token_for(account.id))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let entitlement: Entitlement = response.json().unwrap();
    assert!(!entitlement.is_premium);
    assert!(!entitlement.active);
    assert!(entitlement.tier.is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_activate_yearly_subscription(ctx: &TestContext) {
    let account = ctx.fixtures.create_account("buyer@example.com");
    let token = ctx.token_for(account.id);

    let response = ctx
        .client
        .post_with_auth(
            "/api/premium/activate",
            &json!({ "product_id": "yearly_subscription", "purchase_token": "tok_123" }),
            &token,
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let entitlement: Entitlement = response.json().unwrap();
    assert!(entitlement.active);
    assert_eq!(entitlement.tier, Some(PremiumTier::Yearly));

    // Gated actions now bypass counters
    let response = ctx
        .client
        .post_empty_with_auth("/api/actions/quiz/authorize", &token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.body.as_ref().unwrap().get("via").and_then(|v| v.as_str()),
        Some("premium")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_activation_without_purchase_token(ctx: &TestContext) {
    let account = ctx.fixtures.create_account("cheap@example.com");

    let response = ctx
        .client
        .post_with_auth(
            "/api/premium/activate",
            &json!({ "product_id": "monthly_subscription" }),
            &ctx.token_for(account.id),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("purchase_token is required");
    assert!(!ctx.store.account(account.id).unwrap().is_premium);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_show_expired_premium_as_inactive(ctx: &TestContext) {
    let account = ctx.fixtures.create_expired_premium_account("lapsed@example.com");

    let response = ctx
        .client
        .get_with_auth("/api/premium", &ctx.token_for(account.id))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let entitlement: Entitlement = response.json().unwrap();
    assert!(entitlement.is_premium);
    assert!(!entitlement.active);
}
