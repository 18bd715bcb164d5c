use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    domain::account::{AccountService, MeResponse},
    error::AppResult,
    infrastructure::auth::AuthUser,
};

pub struct AccountController {
    account_service: Arc<AccountService>,
}

impl AccountController {
    pub fn new(account_service: Arc<AccountService>) -> Self {
        Self { account_service }
    }

    /// GET /api/me - Get current account, entitlement and usage
    pub async fn get_me(
        State(controller): State<Arc<AccountController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<MeResponse>> {
        let response = controller
            .account_service
            .get_profile(auth_user.user_id)
            .await?;
        Ok(Json(response))
    }
}
