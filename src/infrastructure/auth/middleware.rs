use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::infrastructure::config::Config;
use crate::{
    domain::auth::JwtManager, error::AppError, infrastructure::repositories::AccountStore,
};
use uuid::Uuid;

/// User context injected into request extensions after authentication
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Authentication middleware.
///
/// Creates the account on first access so every handler behind it can rely
/// on the account row existing.
pub async fn auth_middleware(
    State((accounts, config)): State<(Arc<dyn AccountStore>, Arc<Config>)>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()))?;

    let jwt_manager = JwtManager::new(config.jwt_secret.clone());
    let claims = jwt_manager.validate_token(token)?;
    let user_id = claims.user_id()?;

    let account = accounts.get_or_create(user_id, &claims.email).await?;

    request.extensions_mut().insert(AuthUser {
        user_id: account.id,
        email: account.email,
    });

    Ok(next.run(request).await)
}
