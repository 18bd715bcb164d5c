use super::error::EntitlementServiceError;
use super::model::{ActivateSubscriptionRequest, Entitlement};
use crate::domain::account::PremiumTier;
use crate::infrastructure::repositories::{AccountStore, EntitlementStore};
use chrono::{Months, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct EntitlementService {
    accounts: Arc<dyn AccountStore>,
    entitlements: Arc<dyn EntitlementStore>,
}

impl EntitlementService {
    pub fn new(accounts: Arc<dyn AccountStore>, entitlements: Arc<dyn EntitlementStore>) -> Self {
        Self {
            accounts,
            entitlements,
        }
    }

    pub async fn entitlement(&self, user_id: Uuid) -> Result<Entitlement, EntitlementServiceError> {
        let account = self
            .accounts
            .find_by_id(user_id)
            .await
            .map_err(|e| EntitlementServiceError::Dependency(e.to_string()))?
            .ok_or(EntitlementServiceError::NotFound)?;

        Ok(Entitlement::of(&account, Utc::now()))
    }

    /// Grants premium for one billing period starting now.
    ///
    /// The purchase token is recorded in logs only; receipt verification with
    /// the store happens upstream.
    pub async fn activate_subscription(
        &self,
        user_id: Uuid,
        request: ActivateSubscriptionRequest,
    ) -> Result<Entitlement, EntitlementServiceError> {
        let product_id = required(request.product_id, "product_id")?;
        let purchase_token = required(request.purchase_token, "purchase_token")?;

        let tier = PremiumTier::from_product_id(&product_id);
        let now = Utc::now();
        let expires_at = now
            .checked_add_months(Months::new(tier.period_months()))
            .ok_or_else(|| {
                EntitlementServiceError::Invalid("subscription period out of range".to_string())
            })?;

        tracing::warn!(
            user_id = %user_id,
            product_id = %product_id,
            token_len = purchase_token.len(),
            "Activating subscription without store receipt verification"
        );

        let account = self
            .entitlements
            .set_premium(user_id, tier, expires_at)
            .await
            .map_err(|e| EntitlementServiceError::Dependency(e.to_string()))?
            .ok_or(EntitlementServiceError::NotFound)?;

        tracing::info!(
            user_id = %user_id,
            tier = %tier,
            expires_at = %expires_at,
            "Premium activated"
        );

        Ok(Entitlement::of(&account, now))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, EntitlementServiceError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EntitlementServiceError::Invalid(format!("{} is required", field)))
}
