use crate::domain::account::{Account, PremiumTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Premium view of an account with lazy expiry applied
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entitlement {
    pub is_premium: bool,
    pub tier: Option<PremiumTier>,
    pub expires_at: Option<DateTime<Utc>>,
    /// `is_premium` with the expiry date taken into account
    pub active: bool,
}

impl Entitlement {
    pub fn of(account: &Account, now: DateTime<Utc>) -> Self {
        Self {
            is_premium: account.is_premium,
            tier: account.premium_tier,
            expires_at: account.premium_expires_at,
            active: account.is_premium_active_at(now),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivateSubscriptionRequest {
    pub product_id: Option<String>,
    pub purchase_token: Option<String>,
}
