// End-to-end tests for the TokenGate Backend API
//
// Each test boots the real router on an ephemeral port backed by its own
// in-memory store, so tests are isolated and run in parallel. Fixtures seed
// accounts directly into that store; requests go through a hyper client.

mod helpers;
mod test_account;
mod test_auth;
mod test_health;
mod test_premium;
mod test_referrals;
mod test_rewards;
