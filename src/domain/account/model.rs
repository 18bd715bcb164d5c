use crate::domain::tokens::GatedAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub token_balance: i32,
    pub free_quizzes_used: i32,
    pub free_flashcards_used: i32,
    pub is_premium: bool,
    pub premium_tier: Option<PremiumTier>,
    pub premium_expires_at: Option<DateTime<Utc>>,
    pub has_rated_app: bool,
    pub last_daily_reward_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
pub enum PremiumTier {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "yearly")]
    Yearly,
}

impl PremiumTier {
    /// Store product ids look like `monthly_subscription` / `yearly_subscription`
    pub fn from_product_id(product_id: &str) -> Self {
        if product_id.contains("yearly") {
            PremiumTier::Yearly
        } else {
            PremiumTier::Monthly
        }
    }

    pub fn period_months(self) -> u32 {
        match self {
            PremiumTier::Monthly => 1,
            PremiumTier::Yearly => 12,
        }
    }
}

impl std::fmt::Display for PremiumTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PremiumTier::Monthly => write!(f, "monthly"),
            PremiumTier::Yearly => write!(f, "yearly"),
        }
    }
}

impl Account {
    /// Fresh account with every ledger field at its zero value
    pub fn new(id: Uuid, email: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: email.to_string(),
            token_balance: 0,
            free_quizzes_used: 0,
            free_flashcards_used: 0,
            is_premium: false,
            premium_tier: None,
            premium_expires_at: None,
            has_rated_app: false,
            last_daily_reward_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Premium flag with lazy expiry applied: a past expiry date wins over the stored flag
    pub fn is_premium_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_premium
            && self
                .premium_expires_at
                .map_or(true, |expires_at| expires_at > now)
    }

    pub fn is_premium_active(&self) -> bool {
        self.is_premium_active_at(Utc::now())
    }

    pub fn free_uses_used(&self, action: GatedAction) -> i32 {
        match action {
            GatedAction::Quiz => self.free_quizzes_used,
            GatedAction::Flashcard => self.free_flashcards_used,
        }
    }
}
