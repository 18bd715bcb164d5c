use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    domain::entitlement::{
        ActivateSubscriptionRequest, Entitlement, EntitlementGate, EntitlementService,
    },
    error::AppResult,
    infrastructure::auth::AuthUser,
};

pub struct PremiumController {
    entitlements: Arc<EntitlementService>,
    gate: Arc<EntitlementGate>,
}

impl PremiumController {
    pub fn new(entitlements: Arc<EntitlementService>, gate: Arc<EntitlementGate>) -> Self {
        Self { entitlements, gate }
    }

    /// GET /api/premium
    pub async fn get_entitlement(
        State(controller): State<Arc<PremiumController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<Entitlement>> {
        let entitlement = controller.gate.entitlement(auth_user.user_id).await?;
        Ok(Json(entitlement))
    }

    /// POST /api/premium/activate - Record a completed store purchase
    pub async fn activate(
        State(controller): State<Arc<PremiumController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<ActivateSubscriptionRequest>,
    ) -> AppResult<Json<Entitlement>> {
        let entitlement = controller
            .entitlements
            .activate_subscription(auth_user.user_id, request)
            .await?;
        Ok(Json(entitlement))
    }
}
