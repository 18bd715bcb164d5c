use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    domain::entitlement::EntitlementGate,
    domain::tokens::{
        Authorization, DailyRewardOutcome, DenialReason, FreeUseOutcome, GatedAction,
        GrantOutcome, RatingOutcome, SpendOutcome, TokenEconomyApi, TokenEconomyService,
        TokenTransaction, TransactionHistoryQuery,
    },
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

const DEFAULT_HISTORY_LIMIT: i64 = 50;

pub struct TokensController {
    tokens: Arc<TokenEconomyService>,
    gate: Arc<EntitlementGate>,
}

impl TokensController {
    pub fn new(tokens: Arc<TokenEconomyService>, gate: Arc<EntitlementGate>) -> Self {
        Self { tokens, gate }
    }

    /// GET /api/actions/:action/check - Preview authorization without consuming anything
    pub async fn check(
        State(controller): State<Arc<TokensController>>,
        Extension(auth_user): Extension<AuthUser>,
        Path(action): Path<String>,
    ) -> AppResult<Json<Authorization>> {
        let action = parse_action(&action)?;
        let authorization = controller
            .gate
            .check(Some(auth_user.user_id), action)
            .await?;
        authorization_response(authorization)
    }

    /// POST /api/actions/:action/authorize - Authorize and consume a free use or tokens
    pub async fn authorize(
        State(controller): State<Arc<TokensController>>,
        Extension(auth_user): Extension<AuthUser>,
        Path(action): Path<String>,
    ) -> AppResult<Json<Authorization>> {
        let action = parse_action(&action)?;
        let authorization = controller
            .gate
            .authorize(Some(auth_user.user_id), action)
            .await?;
        authorization_response(authorization)
    }

    /// POST /api/actions/:action/free-use
    pub async fn consume_free_use(
        State(controller): State<Arc<TokensController>>,
        Extension(auth_user): Extension<AuthUser>,
        Path(action): Path<String>,
    ) -> AppResult<Json<FreeUseOutcome>> {
        let action = parse_action(&action)?;
        let outcome = controller
            .tokens
            .consume_free_use(auth_user.user_id, action)
            .await?;
        Ok(Json(outcome))
    }

    /// POST /api/actions/:action/spend
    pub async fn spend(
        State(controller): State<Arc<TokensController>>,
        Extension(auth_user): Extension<AuthUser>,
        Path(action): Path<String>,
    ) -> AppResult<Json<SpendOutcome>> {
        let action = parse_action(&action)?;
        match controller
            .tokens
            .spend_tokens(auth_user.user_id, action)
            .await?
        {
            SpendOutcome::InsufficientTokens { balance, required } => {
                Err(insufficient_tokens(balance, required))
            }
            spent => Ok(Json(spent)),
        }
    }

    /// GET /api/tokens/transactions - Newest first
    pub async fn transactions(
        State(controller): State<Arc<TokensController>>,
        Extension(auth_user): Extension<AuthUser>,
        Query(query): Query<TransactionHistoryQuery>,
    ) -> AppResult<Json<Vec<TokenTransaction>>> {
        let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let history = controller
            .tokens
            .transaction_history(auth_user.user_id, limit)
            .await?;
        Ok(Json(history))
    }

    /// POST /api/rewards/daily
    pub async fn claim_daily(
        State(controller): State<Arc<TokensController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<DailyRewardOutcome>> {
        let outcome = controller
            .tokens
            .claim_daily_reward(auth_user.user_id)
            .await?;
        Ok(Json(outcome))
    }

    /// POST /api/rewards/rating
    pub async fn rate_app(
        State(controller): State<Arc<TokensController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<RatingOutcome>> {
        let outcome = controller.tokens.mark_app_rated(auth_user.user_id).await?;
        Ok(Json(outcome))
    }

    /// POST /api/rewards/ad
    pub async fn ad_watched(
        State(controller): State<Arc<TokensController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<GrantOutcome>> {
        let outcome = controller.tokens.reward_ad_watch(auth_user.user_id).await?;
        Ok(Json(outcome))
    }
}

fn parse_action(raw: &str) -> AppResult<GatedAction> {
    raw.parse::<GatedAction>().map_err(AppError::BadRequest)
}

fn authorization_response(authorization: Authorization) -> AppResult<Json<Authorization>> {
    match authorization {
        Authorization::Denied(DenialReason::InsufficientTokens { balance, required }) => {
            Err(insufficient_tokens(balance, required))
        }
        Authorization::Unauthorized => Err(AppError::Unauthorized("Account not found".to_string())),
        allowed => Ok(Json(allowed)),
    }
}

fn insufficient_tokens(balance: i32, required: i32) -> AppError {
    AppError::PaymentRequired(format!(
        "Insufficient tokens: you have {} but need {}. Upgrade to premium for unlimited access",
        balance, required
    ))
}
