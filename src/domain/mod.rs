pub mod account;
pub mod auth;
pub mod entitlement;
pub mod referral;
pub mod tokens;
