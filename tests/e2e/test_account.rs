use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_get_current_account_info(ctx: &TestContext) {
    let account = ctx.fixtures.create_account_with("me@example.com", |a| {
        a.token_balance = 4;
        a.free_quizzes_used = 1;
    });

    let response = ctx
        .client
        .get_with_auth("/api/me", &ctx.token_for(account.id))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    helpers::assertions::assert_me_response(body);

    assert_eq!(body.get("email").and_then(|v| v.as_str()), Some("me@example.com"));
    assert_eq!(
        body.get("id").and_then(|v| v.as_str()),
        Some(account.id.to_string().as_str())
    );
    assert_eq!(body.get("token_balance").and_then(|v| v.as_i64()), Some(4));

    let quiz = &body["usage"]["quiz"];
    assert_eq!(quiz["free_used"].as_i64(), Some(1));
    assert_eq!(quiz["free_remaining"].as_i64(), Some(1));
    assert_eq!(quiz["token_cost"].as_i64(), Some(3));
    assert_eq!(body["usage"]["flashcard"]["token_cost"].as_i64(), Some(2));

    assert_eq!(body["rewards"]["daily_reward_available"].as_bool(), Some(true));
    assert_eq!(body["premium"]["active"].as_bool(), Some(false));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reflect_claimed_daily_reward(ctx: &TestContext) {
    let account = ctx.fixtures.create_account("claimer@example.com");
    let token = ctx.token_for(account.id);

    ctx.client
        .post_empty_with_auth("/api/rewards/daily", &token)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let response = ctx.client.get_with_auth("/api/me", &token).await.unwrap();
    let body = response.body.as_ref().unwrap();

    assert_eq!(body["token_balance"].as_i64(), Some(5));
    assert_eq!(body["rewards"]["daily_reward_available"].as_bool(), Some(false));
    assert_eq!(body["rewards"]["daily_reward_hours_remaining"].as_i64(), Some(24));
}
