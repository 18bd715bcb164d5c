use rand::{distr::Alphanumeric, Rng};

pub const REFERRAL_CODE_LEN: usize = 8;

pub fn generate_referral_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(REFERRAL_CODE_LEN)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

/// Codes are shared by hand, so accept surrounding whitespace and any casing
pub fn normalize_code(input: &str) -> Option<String> {
    let code = input.trim().to_uppercase();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(code)
}
