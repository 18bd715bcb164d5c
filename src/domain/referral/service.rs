use super::code::{generate_referral_code, normalize_code};
use super::error::ReferralServiceError;
use super::model::{RedemptionOutcome, RedemptionRejection, ReferralCode};
use crate::domain::account::Account;
use crate::domain::tokens::{GrantOutcome, NewTransaction, TokenEconomyService};
use crate::infrastructure::repositories::{AccountStore, ReferralStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const MAX_CODE_ATTEMPTS: usize = 5;

pub struct ReferralRegistry {
    accounts: Arc<dyn AccountStore>,
    referrals: Arc<dyn ReferralStore>,
    tokens: Arc<TokenEconomyService>,
}

impl ReferralRegistry {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        referrals: Arc<dyn ReferralStore>,
        tokens: Arc<TokenEconomyService>,
    ) -> Self {
        Self {
            accounts,
            referrals,
            tokens,
        }
    }
}

#[async_trait]
pub trait ReferralRegistryApi: Send + Sync {
    /// Returns the user's code, creating it on first request
    async fn create_referral_code(
        &self,
        user_id: Uuid,
    ) -> Result<ReferralCode, ReferralServiceError>;

    async fn redeem_referral_code(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<RedemptionOutcome, ReferralServiceError>;
}

#[async_trait]
impl ReferralRegistryApi for ReferralRegistry {
    async fn create_referral_code(
        &self,
        user_id: Uuid,
    ) -> Result<ReferralCode, ReferralServiceError> {
        self.ensure_account(user_id).await?;

        if let Some(existing) = self.existing_code(user_id).await? {
            return Ok(existing);
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let candidate = ReferralCode::pending(generate_referral_code(), user_id, Utc::now());
            let inserted = self
                .referrals
                .insert(&candidate)
                .await
                .map_err(|e| ReferralServiceError::Dependency(e.to_string()))?;

            if inserted {
                tracing::info!(
                    user_id = %user_id,
                    code = %candidate.referral_code,
                    "Referral code created"
                );
                return Ok(candidate);
            }

            // Either a concurrent request created this user's code, or the code collided
            if let Some(existing) = self.existing_code(user_id).await? {
                return Ok(existing);
            }
            tracing::debug!(user_id = %user_id, attempt, "Referral code collision, retrying");
        }

        Err(ReferralServiceError::Dependency(format!(
            "could not allocate a unique referral code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    async fn redeem_referral_code(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<RedemptionOutcome, ReferralServiceError> {
        self.ensure_account(user_id).await?;

        let Some(code) = normalize_code(code) else {
            return Ok(reject(user_id, RedemptionRejection::InvalidCode));
        };

        let referral = self
            .referrals
            .find_by_code(&code)
            .await
            .map_err(|e| ReferralServiceError::Dependency(e.to_string()))?;
        let Some(referral) = referral else {
            return Ok(reject(user_id, RedemptionRejection::InvalidCode));
        };

        if referral.referrer_id == user_id {
            return Ok(reject(user_id, RedemptionRejection::SelfReferral));
        }
        if self.has_redeemed(user_id).await? {
            return Ok(reject(user_id, RedemptionRejection::AlreadyRedeemed));
        }
        if referral.is_completed() {
            return Ok(reject(user_id, RedemptionRejection::AlreadyUsed));
        }

        let policy = self.tokens.policy();
        let referrer_bonus = self
            .tokens
            .referral_bonus(referral.referrer_id, policy.referrer_reward, "Referral bonus")
            .await?;
        let redeemer_bonus = self
            .tokens
            .referral_bonus(user_id, policy.referred_reward, "Referral welcome bonus")
            .await?;
        let bonuses = referrer_bonus
            .iter()
            .chain(redeemer_bonus.iter())
            .cloned()
            .collect();

        let completed = self
            .referrals
            .complete(&code, user_id, Utc::now(), bonuses)
            .await?;

        let Some(completion) = completed else {
            // Lost a race: tell apart "this user redeemed elsewhere" from "code taken"
            let rejection = if self.has_redeemed(user_id).await? {
                RedemptionRejection::AlreadyRedeemed
            } else {
                RedemptionRejection::AlreadyUsed
            };
            return Ok(reject(user_id, rejection));
        };

        let referrer_reward = granted(referrer_bonus.as_ref(), &completion.credited)?;
        let redeemer_reward = granted(redeemer_bonus.as_ref(), &completion.credited)?;

        tracing::info!(
            user_id = %user_id,
            referrer_id = %referral.referrer_id,
            code = %code,
            "Referral code redeemed"
        );

        Ok(RedemptionOutcome::Redeemed {
            referrer_id: referral.referrer_id,
            referrer_reward,
            redeemer_reward,
        })
    }
}

impl ReferralRegistry {
    async fn ensure_account(&self, user_id: Uuid) -> Result<(), ReferralServiceError> {
        self.accounts
            .find_by_id(user_id)
            .await
            .map_err(|e| ReferralServiceError::Dependency(e.to_string()))?
            .map(|_| ())
            .ok_or(ReferralServiceError::NotFound)
    }

    async fn existing_code(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ReferralCode>, ReferralServiceError> {
        self.referrals
            .find_by_referrer(user_id)
            .await
            .map_err(|e| ReferralServiceError::Dependency(e.to_string()))
    }

    async fn has_redeemed(&self, user_id: Uuid) -> Result<bool, ReferralServiceError> {
        self.referrals
            .has_redeemed(user_id)
            .await
            .map_err(|e| ReferralServiceError::Dependency(e.to_string()))
    }
}

/// Reads the post-credit balance for `bonus` out of the completion
fn granted(
    bonus: Option<&NewTransaction>,
    credited: &[Account],
) -> Result<GrantOutcome, ReferralServiceError> {
    let Some(bonus) = bonus else {
        return Ok(GrantOutcome::NoOp);
    };

    credited
        .iter()
        .find(|account| account.id == bonus.user_id)
        .map(|account| GrantOutcome::Granted {
            amount: bonus.amount,
            balance: account.token_balance,
        })
        .ok_or(ReferralServiceError::NotFound)
}

fn reject(user_id: Uuid, reason: RedemptionRejection) -> RedemptionOutcome {
    tracing::warn!(user_id = %user_id, reason = ?reason, "Referral redemption rejected");
    RedemptionOutcome::Rejected { reason }
}
