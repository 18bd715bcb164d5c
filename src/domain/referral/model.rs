use crate::domain::tokens::GrantOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReferralCode {
    pub id: Uuid,
    pub referral_code: String,
    pub referrer_id: Uuid,
    pub referred_user_id: Option<Uuid>,
    pub status: ReferralStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
pub enum ReferralStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "completed")]
    Completed,
}

impl std::fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferralStatus::Pending => write!(f, "pending"),
            ReferralStatus::Completed => write!(f, "completed"),
        }
    }
}

impl ReferralCode {
    pub fn pending(code: String, referrer_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            referral_code: code,
            referrer_id,
            referred_user_id: None,
            status: ReferralStatus::Pending,
            completed_at: None,
            created_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ReferralStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionRejection {
    InvalidCode,
    SelfReferral,
    /// The redeeming user already redeemed a code before
    AlreadyRedeemed,
    /// The code was already redeemed by someone else
    AlreadyUsed,
}

impl RedemptionRejection {
    pub fn message(self) -> &'static str {
        match self {
            RedemptionRejection::InvalidCode => "Invalid referral code",
            RedemptionRejection::SelfReferral => "You cannot use your own referral code",
            RedemptionRejection::AlreadyRedeemed => "You have already used a referral code",
            RedemptionRejection::AlreadyUsed => "This referral code has already been used",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RedemptionOutcome {
    Redeemed {
        referrer_id: Uuid,
        referrer_reward: GrantOutcome,
        redeemer_reward: GrantOutcome,
    },
    Rejected { reason: RedemptionRejection },
}
