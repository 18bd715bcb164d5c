use super::dto::{GatedActionUsage, MeResponse, RewardsDto, UsageDto};
use super::Account;
use crate::domain::entitlement::Entitlement;
use crate::domain::tokens::{EconomyPolicy, GatedAction};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::AccountStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    policy: EconomyPolicy,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStore>, policy: EconomyPolicy) -> Self {
        Self { accounts, policy }
    }

    /// Get account profile with entitlement and usage info
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<MeResponse> {
        let account = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        Ok(self.build_me_response(&account, Utc::now()))
    }

    fn build_me_response(&self, account: &Account, now: DateTime<Utc>) -> MeResponse {
        let premium = Entitlement::of(account, now);
        let hours_remaining = if premium.active {
            None
        } else {
            self.policy
                .daily_hours_remaining(account.last_daily_reward_at, now)
        };

        MeResponse {
            id: account.id,
            email: account.email.clone(),
            token_balance: account.token_balance,
            usage: UsageDto {
                quiz: self.usage_for(account, GatedAction::Quiz),
                flashcard: self.usage_for(account, GatedAction::Flashcard),
            },
            rewards: RewardsDto {
                has_rated_app: account.has_rated_app,
                // Premium accounts earn nothing, so there is nothing to claim
                daily_reward_available: !premium.active && hours_remaining.is_none(),
                daily_reward_hours_remaining: hours_remaining,
            },
            premium,
            created_at: account.created_at,
        }
    }

    fn usage_for(&self, account: &Account, action: GatedAction) -> GatedActionUsage {
        let free_used = account.free_uses_used(action);
        GatedActionUsage {
            free_used,
            free_cap: self.policy.free_use_cap,
            free_remaining: (self.policy.free_use_cap - free_used).max(0),
            token_cost: self.policy.cost(action),
        }
    }
}
