pub mod account;
pub mod health;
pub mod premium;
pub mod referral;
pub mod tokens;
