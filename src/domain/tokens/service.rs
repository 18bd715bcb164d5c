use super::error::TokenServiceError;
use super::model::{
    AccessPath, Authorization, DailyRewardOutcome, DenialReason, FreeUseOutcome, GatedAction,
    GrantOutcome, NewTransaction, RatingOutcome, SpendOutcome, TokenTransaction, TransactionKind,
};
use super::policy::EconomyPolicy;
use crate::domain::account::Account;
use crate::infrastructure::repositories::{AccountStore, TransactionLog, UsageLedger};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

const MAX_HISTORY_LIMIT: i64 = 200;

pub struct TokenEconomyService {
    accounts: Arc<dyn AccountStore>,
    ledger: Arc<dyn UsageLedger>,
    transactions: Arc<dyn TransactionLog>,
    policy: EconomyPolicy,
}

impl TokenEconomyService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        ledger: Arc<dyn UsageLedger>,
        transactions: Arc<dyn TransactionLog>,
        policy: EconomyPolicy,
    ) -> Self {
        Self {
            accounts,
            ledger,
            transactions,
            policy,
        }
    }

    pub fn policy(&self) -> &EconomyPolicy {
        &self.policy
    }
}

#[async_trait]
pub trait TokenEconomyApi: Send + Sync {
    /// Read-only decision: premium, then free use, then tokens.
    ///
    /// When this returns `Allowed` via `FreeUse` or `Tokens` the caller still
    /// has to call `consume_free_use` / `spend_tokens`. Prefer
    /// `authorize_gated_action`, which decides and consumes in one call.
    async fn can_perform_gated_action(
        &self,
        user_id: Uuid,
        action: GatedAction,
    ) -> Result<Authorization, TokenServiceError>;

    /// Decide and consume in one call
    async fn authorize_gated_action(
        &self,
        user_id: Uuid,
        action: GatedAction,
    ) -> Result<Authorization, TokenServiceError>;

    async fn consume_free_use(
        &self,
        user_id: Uuid,
        action: GatedAction,
    ) -> Result<FreeUseOutcome, TokenServiceError>;

    async fn spend_tokens(
        &self,
        user_id: Uuid,
        action: GatedAction,
    ) -> Result<SpendOutcome, TokenServiceError>;

    /// Adds `amount` tokens as a reward. No-op for premium accounts.
    async fn grant_tokens(
        &self,
        user_id: Uuid,
        amount: i32,
        reason: &str,
    ) -> Result<GrantOutcome, TokenServiceError>;

    async fn claim_daily_reward(&self, user_id: Uuid)
        -> Result<DailyRewardOutcome, TokenServiceError>;

    async fn mark_app_rated(&self, user_id: Uuid) -> Result<RatingOutcome, TokenServiceError>;

    /// Trusts the caller that an ad was actually watched
    async fn reward_ad_watch(&self, user_id: Uuid) -> Result<GrantOutcome, TokenServiceError>;

    async fn transaction_history(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<TokenTransaction>, TokenServiceError>;
}

#[async_trait]
impl TokenEconomyApi for TokenEconomyService {
    async fn can_perform_gated_action(
        &self,
        user_id: Uuid,
        action: GatedAction,
    ) -> Result<Authorization, TokenServiceError> {
        let Some(account) = self.lookup(user_id).await? else {
            return Ok(Authorization::Unauthorized);
        };

        Ok(self.evaluate(&account, action, Utc::now()))
    }

    async fn authorize_gated_action(
        &self,
        user_id: Uuid,
        action: GatedAction,
    ) -> Result<Authorization, TokenServiceError> {
        let Some(account) = self.lookup(user_id).await? else {
            return Ok(Authorization::Unauthorized);
        };

        if account.is_premium_active() {
            tracing::info!(user_id = %user_id, action = %action, "Gated action allowed for premium");
            return Ok(Authorization::Allowed {
                via: AccessPath::Premium,
            });
        }

        if account.free_uses_used(action) < self.policy.free_use_cap {
            let consumed = self
                .ledger
                .try_consume_free_use(user_id, action, self.policy.free_use_cap)
                .await
                .map_err(|e| TokenServiceError::Dependency(e.to_string()))?;
            if let Some(updated) = consumed {
                tracing::info!(
                    user_id = %user_id,
                    action = %action,
                    free_uses_used = updated.free_uses_used(action),
                    "Gated action allowed on free use"
                );
                return Ok(Authorization::Allowed {
                    via: AccessPath::FreeUse,
                });
            }
            // Lost the last free use to a concurrent call; fall through to tokens
        }

        match self.spend_tokens(user_id, action).await? {
            SpendOutcome::Spent { .. } => Ok(Authorization::Allowed {
                via: AccessPath::Tokens,
            }),
            SpendOutcome::InsufficientTokens { balance, required } => {
                Ok(Authorization::Denied(DenialReason::InsufficientTokens {
                    balance,
                    required,
                }))
            }
        }
    }

    async fn consume_free_use(
        &self,
        user_id: Uuid,
        action: GatedAction,
    ) -> Result<FreeUseOutcome, TokenServiceError> {
        let cap = self.policy.free_use_cap;
        let consumed = self
            .ledger
            .try_consume_free_use(user_id, action, cap)
            .await
            .map_err(|e| TokenServiceError::Dependency(e.to_string()))?;

        match consumed {
            Some(account) => Ok(FreeUseOutcome::Consumed {
                remaining: cap - account.free_uses_used(action),
            }),
            None => {
                self.find_account(user_id).await?;
                tracing::warn!(user_id = %user_id, action = %action, "Free use requested past cap");
                Ok(FreeUseOutcome::CapReached)
            }
        }
    }

    async fn spend_tokens(
        &self,
        user_id: Uuid,
        action: GatedAction,
    ) -> Result<SpendOutcome, TokenServiceError> {
        let cost = self.policy.cost(action);
        let debit = entry(
            user_id,
            -cost,
            action.transaction_kind(),
            action.spend_description(),
        );
        let debited = self
            .ledger
            .try_debit(debit)
            .await
            .map_err(|e| TokenServiceError::Dependency(e.to_string()))?;

        let Some(account) = debited else {
            let account = self.find_account(user_id).await?;
            return Ok(SpendOutcome::InsufficientTokens {
                balance: account.token_balance,
                required: cost,
            });
        };

        tracing::info!(
            user_id = %user_id,
            action = %action,
            cost,
            balance = account.token_balance,
            "Tokens spent"
        );

        Ok(SpendOutcome::Spent {
            amount: cost,
            balance: account.token_balance,
        })
    }

    async fn grant_tokens(
        &self,
        user_id: Uuid,
        amount: i32,
        reason: &str,
    ) -> Result<GrantOutcome, TokenServiceError> {
        self.grant(user_id, amount, TransactionKind::Reward, reason)
            .await
    }

    async fn claim_daily_reward(
        &self,
        user_id: Uuid,
    ) -> Result<DailyRewardOutcome, TokenServiceError> {
        let now = Utc::now();
        let account = self.find_account(user_id).await?;

        if account.is_premium_active_at(now) {
            return Ok(DailyRewardOutcome::NoOp);
        }

        if let Some(hours_remaining) = self
            .policy
            .daily_hours_remaining(account.last_daily_reward_at, now)
        {
            return Ok(DailyRewardOutcome::AlreadyClaimed { hours_remaining });
        }

        let amount = self.policy.daily_reward;
        let reward = entry(user_id, amount, TransactionKind::Reward, "Daily login reward");
        let claimed = self
            .ledger
            .try_claim_daily(now, self.policy.daily_cooldown(), reward)
            .await
            .map_err(|e| TokenServiceError::Dependency(e.to_string()))?;

        let Some(account) = claimed else {
            // A concurrent claim stamped the timestamp between our read and write
            let account = self.find_account(user_id).await?;
            let hours_remaining = self
                .policy
                .daily_hours_remaining(account.last_daily_reward_at, now)
                .unwrap_or(self.policy.daily_cooldown_hours);
            return Ok(DailyRewardOutcome::AlreadyClaimed { hours_remaining });
        };

        tracing::info!(
            user_id = %user_id,
            amount,
            balance = account.token_balance,
            "Daily reward claimed"
        );

        Ok(DailyRewardOutcome::Granted {
            amount,
            balance: account.token_balance,
        })
    }

    async fn mark_app_rated(&self, user_id: Uuid) -> Result<RatingOutcome, TokenServiceError> {
        let account = self.find_account(user_id).await?;

        if account.is_premium_active() {
            return Ok(RatingOutcome::NoOp);
        }
        if account.has_rated_app {
            return Ok(RatingOutcome::AlreadyRated);
        }

        let amount = self.policy.rating_reward;
        let reward = entry(user_id, amount, TransactionKind::Reward, "App rating reward");
        let marked = self
            .ledger
            .try_mark_rated(reward)
            .await
            .map_err(|e| TokenServiceError::Dependency(e.to_string()))?;
        let Some(account) = marked else {
            return Ok(RatingOutcome::AlreadyRated);
        };

        tracing::info!(
            user_id = %user_id,
            amount,
            balance = account.token_balance,
            "App rating rewarded"
        );

        Ok(RatingOutcome::Granted {
            amount,
            balance: account.token_balance,
        })
    }

    async fn reward_ad_watch(&self, user_id: Uuid) -> Result<GrantOutcome, TokenServiceError> {
        // TODO: verify completion through the ad network's server-side reward callback
        self.grant(
            user_id,
            self.policy.ad_reward,
            TransactionKind::Reward,
            "Watched a rewarded ad",
        )
        .await
    }

    async fn transaction_history(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<TokenTransaction>, TokenServiceError> {
        if limit <= 0 {
            return Err(TokenServiceError::Invalid(
                "limit must be positive".to_string(),
            ));
        }

        self.transactions
            .list_for_user(user_id, limit.min(MAX_HISTORY_LIMIT))
            .await
            .map_err(|e| TokenServiceError::Dependency(e.to_string()))
    }
}

impl TokenEconomyService {
    /// The credit a referral bonus would apply, or `None` for a premium
    /// account. The referral store applies it together with the redemption.
    pub async fn referral_bonus(
        &self,
        user_id: Uuid,
        amount: i32,
        description: &str,
    ) -> Result<Option<NewTransaction>, TokenServiceError> {
        let account = self.find_account(user_id).await?;
        if account.is_premium_active() {
            tracing::debug!(user_id = %user_id, "Skipping referral bonus for premium account");
            return Ok(None);
        }

        Ok(Some(entry(
            user_id,
            amount,
            TransactionKind::Referral,
            description,
        )))
    }

    fn evaluate(&self, account: &Account, action: GatedAction, now: DateTime<Utc>) -> Authorization {
        if account.is_premium_active_at(now) {
            return Authorization::Allowed {
                via: AccessPath::Premium,
            };
        }

        if account.free_uses_used(action) < self.policy.free_use_cap {
            return Authorization::Allowed {
                via: AccessPath::FreeUse,
            };
        }

        let cost = self.policy.cost(action);
        if account.token_balance >= cost {
            return Authorization::Allowed {
                via: AccessPath::Tokens,
            };
        }

        Authorization::Denied(DenialReason::InsufficientTokens {
            balance: account.token_balance,
            required: cost,
        })
    }

    async fn grant(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: TransactionKind,
        description: &str,
    ) -> Result<GrantOutcome, TokenServiceError> {
        if amount <= 0 {
            return Err(TokenServiceError::Invalid(format!(
                "Grant amount must be positive, got {}",
                amount
            )));
        }

        let account = self.find_account(user_id).await?;
        if account.is_premium_active() {
            tracing::debug!(user_id = %user_id, kind = %kind, "Skipping grant for premium account");
            return Ok(GrantOutcome::NoOp);
        }

        let account = self
            .ledger
            .credit(entry(user_id, amount, kind, description))
            .await
            .map_err(|e| TokenServiceError::Dependency(e.to_string()))?
            .ok_or(TokenServiceError::NotFound)?;

        tracing::info!(
            user_id = %user_id,
            kind = %kind,
            amount,
            balance = account.token_balance,
            "Tokens granted"
        );

        Ok(GrantOutcome::Granted {
            amount,
            balance: account.token_balance,
        })
    }

    async fn lookup(&self, user_id: Uuid) -> Result<Option<Account>, TokenServiceError> {
        self.accounts
            .find_by_id(user_id)
            .await
            .map_err(|e| TokenServiceError::Dependency(e.to_string()))
    }

    async fn find_account(&self, user_id: Uuid) -> Result<Account, TokenServiceError> {
        self.lookup(user_id)
            .await?
            .ok_or(TokenServiceError::NotFound)
    }
}

fn entry(user_id: Uuid, amount: i32, kind: TransactionKind, description: &str) -> NewTransaction {
    NewTransaction {
        user_id,
        amount,
        kind,
        description: description.to_string(),
    }
}
