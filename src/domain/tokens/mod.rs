pub mod error;
pub mod model;
pub mod policy;
pub mod service;

pub use error::TokenServiceError;
pub use model::{
    AccessPath, Authorization, DailyRewardOutcome, DenialReason, FreeUseOutcome, GatedAction,
    GrantOutcome, NewTransaction, RatingOutcome, SpendOutcome, TokenTransaction, TransactionKind,
};
pub use policy::EconomyPolicy;
pub use service::{TokenEconomyApi, TokenEconomyService};

use serde::{Deserialize, Serialize};

/// Query for GET /api/tokens/transactions
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionHistoryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

