use axum::{
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::controllers::{
    account::AccountController, health, premium::PremiumController,
    referral::ReferralController, tokens::TokensController,
};
use crate::domain::{
    account::AccountService,
    entitlement::{EntitlementGate, EntitlementService},
    referral::ReferralRegistry,
    tokens::TokenEconomyService,
};
use crate::infrastructure::auth::{auth_middleware, request_id_middleware, RequestId};
use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::Repositories;

/// Wire services and controllers over the given stores and build the router
pub fn build_app(config: Arc<Config>, repos: Repositories) -> Router {
    tracing::info!("Instantiating services...");
    let tokens = Arc::new(TokenEconomyService::new(
        repos.accounts.clone(),
        repos.ledger.clone(),
        repos.transactions.clone(),
        config.economy.clone(),
    ));
    let entitlements = Arc::new(EntitlementService::new(
        repos.accounts.clone(),
        repos.entitlements.clone(),
    ));
    let gate = Arc::new(EntitlementGate::new(entitlements.clone(), tokens.clone()));
    let referrals = Arc::new(ReferralRegistry::new(
        repos.accounts.clone(),
        repos.referrals.clone(),
        tokens.clone(),
    ));
    let account_service = Arc::new(AccountService::new(
        repos.accounts.clone(),
        config.economy.clone(),
    ));

    tracing::info!("Instantiating controllers...");
    let tokens_controller = Arc::new(TokensController::new(tokens, gate.clone()));
    let referral_controller = Arc::new(ReferralController::new(referrals));
    let premium_controller = Arc::new(PremiumController::new(entitlements, gate));
    let account_controller = Arc::new(AccountController::new(account_service));

    let auth_state = (repos.accounts.clone(), config.clone());

    let account_routes = Router::new()
        .route("/api/me", get(AccountController::get_me))
        .with_state(account_controller);

    let token_routes = Router::new()
        .route("/api/tokens/transactions", get(TokensController::transactions))
        .route("/api/actions/:action/check", get(TokensController::check))
        .route("/api/actions/:action/authorize", post(TokensController::authorize))
        .route("/api/actions/:action/free-use", post(TokensController::consume_free_use))
        .route("/api/actions/:action/spend", post(TokensController::spend))
        .route("/api/rewards/daily", post(TokensController::claim_daily))
        .route("/api/rewards/rating", post(TokensController::rate_app))
        .route("/api/rewards/ad", post(TokensController::ad_watched))
        .with_state(tokens_controller);

    let referral_routes = Router::new()
        .route("/api/referrals", post(ReferralController::create_code))
        .route("/api/referrals/redeem", post(ReferralController::redeem))
        .with_state(referral_controller);

    let premium_routes = Router::new()
        .route("/api/premium", get(PremiumController::get_entitlement))
        .route("/api/premium/activate", post(PremiumController::activate))
        .with_state(premium_controller);

    // Everything under /api requires a valid bearer token
    let api_routes = Router::new()
        .merge(account_routes)
        .merge(token_routes)
        .merge(referral_routes)
        .merge(premium_routes)
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(repos.pool.clone())
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .extensions()
                        .get::<RequestId>()
                        .map(|id| id.0.as_str())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(cors),
        )
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
