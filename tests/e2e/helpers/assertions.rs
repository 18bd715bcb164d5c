use serde_json::Value;

pub fn assert_status_tag(body: &Value, expected: &str) {
    assert_eq!(
        body.get("status").and_then(|v| v.as_str()),
        Some(expected),
        "Unexpected outcome body: {}",
        body
    );
}

pub fn assert_granted(body: &Value, amount: i64, balance: i64) {
    assert_status_tag(body, "granted");
    assert_eq!(body.get("amount").and_then(|v| v.as_i64()), Some(amount));
    assert_eq!(body.get("balance").and_then(|v| v.as_i64()), Some(balance));
}

pub fn assert_allowed_via(body: &Value, path: &str) {
    assert_status_tag(body, "allowed");
    assert_eq!(body.get("via").and_then(|v| v.as_str()), Some(path));
}

pub fn assert_me_response(me: &Value) {
    assert!(me.get("id").and_then(|v| v.as_str()).is_some());
    assert!(me.get("email").and_then(|v| v.as_str()).is_some());
    assert!(me.get("token_balance").and_then(|v| v.as_i64()).is_some());

    let premium = me.get("premium").expect("Missing premium");
    assert!(premium.get("is_premium").is_some());
    assert!(premium.get("active").is_some());

    let usage = me.get("usage").expect("Missing usage");
    for action in ["quiz", "flashcard"] {
        let entry = usage.get(action).expect("Missing usage entry");
        assert!(entry.get("free_used").is_some());
        assert!(entry.get("free_cap").is_some());
        assert!(entry.get("token_cost").is_some());
    }

    let rewards = me.get("rewards").expect("Missing rewards");
    assert!(rewards.get("has_rated_app").is_some());
    assert!(rewards.get("daily_reward_available").is_some());
}
