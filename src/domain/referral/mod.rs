pub mod code;
pub mod error;
pub mod model;
pub mod service;

pub use error::ReferralServiceError;
pub use model::{
    RedemptionOutcome, RedemptionRejection, ReferralCode, ReferralStatus,
};
pub use service::{ReferralRegistry, ReferralRegistryApi};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct RedeemReferralRequest {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReferralCodeResponse {
    pub code: String,
    pub status: ReferralStatus,
}
