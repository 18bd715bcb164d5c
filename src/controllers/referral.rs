use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    domain::referral::{
        RedeemReferralRequest, RedemptionOutcome, RedemptionRejection, ReferralCodeResponse,
        ReferralRegistry, ReferralRegistryApi,
    },
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

pub struct ReferralController {
    registry: Arc<ReferralRegistry>,
}

impl ReferralController {
    pub fn new(registry: Arc<ReferralRegistry>) -> Self {
        Self { registry }
    }

    /// POST /api/referrals - Get or create the caller's referral code
    pub async fn create_code(
        State(controller): State<Arc<ReferralController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<ReferralCodeResponse>> {
        let referral = controller
            .registry
            .create_referral_code(auth_user.user_id)
            .await?;

        Ok(Json(ReferralCodeResponse {
            code: referral.referral_code,
            status: referral.status,
        }))
    }

    /// POST /api/referrals/redeem
    pub async fn redeem(
        State(controller): State<Arc<ReferralController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<RedeemReferralRequest>,
    ) -> AppResult<Json<RedemptionOutcome>> {
        let outcome = controller
            .registry
            .redeem_referral_code(auth_user.user_id, &request.code)
            .await?;

        match outcome {
            RedemptionOutcome::Rejected { reason } => Err(rejection_error(reason)),
            redeemed => Ok(Json(redeemed)),
        }
    }
}

fn rejection_error(reason: RedemptionRejection) -> AppError {
    let message = reason.message().to_string();
    match reason {
        RedemptionRejection::InvalidCode => AppError::NotFound(message),
        RedemptionRejection::SelfReferral => AppError::BadRequest(message),
        RedemptionRejection::AlreadyRedeemed | RedemptionRejection::AlreadyUsed => {
            AppError::Conflict(message)
        }
    }
}
