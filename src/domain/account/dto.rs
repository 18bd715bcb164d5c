use crate::domain::entitlement::Entitlement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response for GET /api/me
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub token_balance: i32,
    pub premium: Entitlement,
    pub usage: UsageDto,
    pub rewards: RewardsDto,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsageDto {
    pub quiz: GatedActionUsage,
    pub flashcard: GatedActionUsage,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatedActionUsage {
    pub free_used: i32,
    pub free_cap: i32,
    pub free_remaining: i32,
    pub token_cost: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RewardsDto {
    pub has_rated_app: bool,
    pub daily_reward_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_reward_hours_remaining: Option<i64>,
}
