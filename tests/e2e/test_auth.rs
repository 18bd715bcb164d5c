use crate::e2e::helpers;

use helpers::{generate_test_jwt_with_email, TestContext};
use hyper::StatusCode;
use test_context::test_context;
use uuid::Uuid;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_requests_without_token(ctx: &TestContext) {
    let response = ctx.client.get("/api/me").await.unwrap();

    response
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_error_message("Missing authorization header");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_non_bearer_scheme(ctx: &TestContext) {
    let response = ctx
        .client
        .get_with_header("/api/me", "Authorization", "Basic dXNlcjpwYXNz")
        .await
        .unwrap();

    response
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_error_message("Invalid authorization format");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_token_signed_with_another_secret(ctx: &TestContext) {
    let token = generate_test_jwt_with_email(&Uuid::new_v4(), "x@example.com", "wrong-secret");

    let response = ctx.client.get_with_auth("/api/me", &token).await.unwrap();

    response
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_error_message("Invalid token");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_create_account_on_first_access(ctx: &TestContext) {
    let user_id = Uuid::new_v4();
    let token = generate_test_jwt_with_email(&user_id, "new@example.com", &ctx.config.jwt_secret);
    assert!(ctx.store.account(user_id).is_none());

    let response = ctx.client.get_with_auth("/api/me", &token).await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body.get("email").and_then(|v| v.as_str()), Some("new@example.com"));
    assert_eq!(body.get("token_balance").and_then(|v| v.as_i64()), Some(0));

    let account = ctx.store.account(user_id).unwrap();
    assert_eq!(account.free_quizzes_used, 0);
    assert!(!account.has_rated_app);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_reset_existing_account_on_login(ctx: &TestContext) {
    let account = ctx
        .fixtures
        .create_account_with("old@example.com", |a| a.token_balance = 12);
    let token = ctx.token_for(account.id);

    ctx.client.get_with_auth("/api/me", &token).await.unwrap();
    ctx.client.get_with_auth("/api/me", &token).await.unwrap();

    assert_eq!(ctx.fixtures.balance(account.id), 12);
}
