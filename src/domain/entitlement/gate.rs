use super::error::EntitlementServiceError;
use super::model::Entitlement;
use super::service::EntitlementService;
use crate::domain::tokens::{Authorization, GatedAction, TokenEconomyApi, TokenEconomyService};
use std::sync::Arc;
use uuid::Uuid;

/// Single entry point for "may this caller do X".
///
/// A `None` user id is a caller without a session: every check answers
/// `Unauthorized` and nothing touches the store.
pub struct EntitlementGate {
    entitlements: Arc<EntitlementService>,
    tokens: Arc<TokenEconomyService>,
}

impl EntitlementGate {
    pub fn new(entitlements: Arc<EntitlementService>, tokens: Arc<TokenEconomyService>) -> Self {
        Self {
            entitlements,
            tokens,
        }
    }

    /// Premium view for a signed-in caller
    pub async fn entitlement(&self, user_id: Uuid) -> Result<Entitlement, EntitlementServiceError> {
        self.entitlements.entitlement(user_id).await
    }

    /// `false` for anonymous callers and unknown accounts
    pub async fn is_premium_active(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<bool, EntitlementServiceError> {
        let Some(user_id) = user_id else {
            return Ok(false);
        };

        match self.entitlement(user_id).await {
            Ok(entitlement) => Ok(entitlement.active),
            Err(EntitlementServiceError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Decides and consumes (free use or tokens) in one call
    pub async fn authorize(
        &self,
        user_id: Option<Uuid>,
        action: GatedAction,
    ) -> Result<Authorization, EntitlementServiceError> {
        let Some(user_id) = user_id else {
            return Ok(Authorization::Unauthorized);
        };

        let authorization = self.tokens.authorize_gated_action(user_id, action).await?;
        if !authorization.is_allowed() {
            tracing::info!(user_id = %user_id, action = %action, "Gated action denied");
        }
        Ok(authorization)
    }

    /// Read-only preview of `authorize`
    pub async fn check(
        &self,
        user_id: Option<Uuid>,
        action: GatedAction,
    ) -> Result<Authorization, EntitlementServiceError> {
        match user_id {
            Some(user_id) => Ok(self.tokens.can_perform_gated_action(user_id, action).await?),
            None => Ok(Authorization::Unauthorized),
        }
    }
}
