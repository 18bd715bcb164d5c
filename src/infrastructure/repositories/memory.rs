use super::{
    AccountStore, EntitlementStore, ReferralCompletion, ReferralStore, TransactionLog, UsageLedger,
};
use crate::domain::account::{Account, PremiumTier};
use crate::domain::referral::{ReferralCode, ReferralStatus};
use crate::domain::tokens::{GatedAction, NewTransaction, TokenTransaction};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<Uuid, Account>,
    transactions: Vec<TokenTransaction>,
    referrals: HashMap<String, ReferralCode>,
    log_unavailable: bool,
}

impl MemoryState {
    fn log_row(&self, entry: NewTransaction, now: DateTime<Utc>) -> AppResult<TokenTransaction> {
        if self.log_unavailable {
            return Err(AppError::StoreUnavailable(
                "transaction log unavailable".to_string(),
            ));
        }
        Ok(entry.into_transaction(now))
    }
}

/// Process-local store backing every store trait.
///
/// One mutex guards all tables, so each trait method is atomic with respect to
/// the others, matching the transactional guarantees of the Postgres
/// repositories. Used for local development and the test-suite.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account as-is
    pub fn insert_account(&self, account: Account) {
        self.state.lock().accounts.insert(account.id, account);
    }

    pub fn account(&self, user_id: Uuid) -> Option<Account> {
        self.state.lock().accounts.get(&user_id).cloned()
    }

    pub fn referral(&self, code: &str) -> Option<ReferralCode> {
        self.state.lock().referrals.get(code).cloned()
    }

    /// While set, every write that needs a transaction-log row fails with
    /// `StoreUnavailable` and applies nothing
    pub fn set_log_unavailable(&self, unavailable: bool) {
        self.state.lock().log_unavailable = unavailable;
    }

    /// Applies `f` to the account if present and returns the updated copy
    fn update_account<F>(&self, user_id: Uuid, f: F) -> Option<Account>
    where
        F: FnOnce(&mut Account) -> bool,
    {
        let mut state = self.state.lock();
        let account = state.accounts.get_mut(&user_id)?;
        if !f(account) {
            return None;
        }
        account.updated_at = Utc::now();
        Some(account.clone())
    }

    /// Like `update_account`, but also appends `entry`. The account change is
    /// kept only when the log row is written too.
    fn update_and_log<F>(&self, entry: NewTransaction, f: F) -> AppResult<Option<Account>>
    where
        F: FnOnce(&mut Account) -> bool,
    {
        let mut state = self.state.lock();
        let Some(current) = state.accounts.get(&entry.user_id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        if !f(&mut updated) {
            return Ok(None);
        }

        let now = Utc::now();
        updated.updated_at = now;
        let row = state.log_row(entry, now)?;
        state.accounts.insert(updated.id, updated.clone());
        state.transactions.push(row);
        Ok(Some(updated))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.account(user_id))
    }

    async fn get_or_create(&self, user_id: Uuid, email: &str) -> AppResult<Account> {
        let mut state = self.state.lock();
        let account = state
            .accounts
            .entry(user_id)
            .or_insert_with(|| Account::new(user_id, email, Utc::now()));
        Ok(account.clone())
    }
}

#[async_trait]
impl UsageLedger for InMemoryStore {
    async fn try_consume_free_use(
        &self,
        user_id: Uuid,
        action: GatedAction,
        cap: i32,
    ) -> AppResult<Option<Account>> {
        Ok(self.update_account(user_id, |account| {
            let counter = match action {
                GatedAction::Quiz => &mut account.free_quizzes_used,
                GatedAction::Flashcard => &mut account.free_flashcards_used,
            };
            if *counter >= cap {
                return false;
            }
            *counter += 1;
            true
        }))
    }

    async fn try_debit(&self, entry: NewTransaction) -> AppResult<Option<Account>> {
        let amount = entry.amount;
        self.update_and_log(entry, |account| {
            if account.token_balance + amount < 0 {
                return false;
            }
            account.token_balance += amount;
            true
        })
    }

    async fn credit(&self, entry: NewTransaction) -> AppResult<Option<Account>> {
        let amount = entry.amount;
        self.update_and_log(entry, |account| {
            account.token_balance += amount;
            true
        })
    }

    async fn try_mark_rated(&self, reward: NewTransaction) -> AppResult<Option<Account>> {
        let amount = reward.amount;
        self.update_and_log(reward, |account| {
            if account.has_rated_app {
                return false;
            }
            account.has_rated_app = true;
            account.token_balance += amount;
            true
        })
    }

    async fn try_claim_daily(
        &self,
        now: DateTime<Utc>,
        cooldown: Duration,
        reward: NewTransaction,
    ) -> AppResult<Option<Account>> {
        let amount = reward.amount;
        self.update_and_log(reward, |account| {
            let claimable = account
                .last_daily_reward_at
                .map_or(true, |last| last <= now - cooldown);
            if claimable {
                account.last_daily_reward_at = Some(now);
                account.token_balance += amount;
            }
            claimable
        })
    }
}

#[async_trait]
impl EntitlementStore for InMemoryStore {
    async fn set_premium(
        &self,
        user_id: Uuid,
        tier: PremiumTier,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Account>> {
        Ok(self.update_account(user_id, |account| {
            account.is_premium = true;
            account.premium_tier = Some(tier);
            account.premium_expires_at = Some(expires_at);
            true
        }))
    }
}

#[async_trait]
impl TransactionLog for InMemoryStore {
    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<TokenTransaction>> {
        let state = self.state.lock();
        let limit = usize::try_from(limit).unwrap_or(0);
        // Appends are chronological, so reverse order is newest first
        Ok(state
            .transactions
            .iter()
            .rev()
            .filter(|tx| tx.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReferralStore for InMemoryStore {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<ReferralCode>> {
        Ok(self.referral(code))
    }

    async fn find_by_referrer(&self, referrer_id: Uuid) -> AppResult<Option<ReferralCode>> {
        let state = self.state.lock();
        Ok(state
            .referrals
            .values()
            .find(|r| r.referrer_id == referrer_id)
            .cloned())
    }

    async fn has_redeemed(&self, user_id: Uuid) -> AppResult<bool> {
        let state = self.state.lock();
        Ok(state
            .referrals
            .values()
            .any(|r| r.referred_user_id == Some(user_id)))
    }

    async fn insert(&self, referral: &ReferralCode) -> AppResult<bool> {
        let mut state = self.state.lock();
        let taken = state.referrals.contains_key(&referral.referral_code)
            || state
                .referrals
                .values()
                .any(|r| r.referrer_id == referral.referrer_id);
        if taken {
            return Ok(false);
        }
        state
            .referrals
            .insert(referral.referral_code.clone(), referral.clone());
        Ok(true)
    }

    async fn complete(
        &self,
        code: &str,
        redeemer_id: Uuid,
        now: DateTime<Utc>,
        bonuses: Vec<NewTransaction>,
    ) -> AppResult<Option<ReferralCompletion>> {
        let mut state = self.state.lock();
        let already_redeemed = state
            .referrals
            .values()
            .any(|r| r.referred_user_id == Some(redeemer_id));
        if already_redeemed {
            return Ok(None);
        }
        match state.referrals.get(code) {
            Some(referral) if referral.status == ReferralStatus::Pending => {}
            _ => return Ok(None),
        }

        // Stage every change first so a failure leaves the state untouched
        let stamp = Utc::now();
        let mut credited = Vec::with_capacity(bonuses.len());
        let mut rows = Vec::with_capacity(bonuses.len());
        for bonus in bonuses {
            let mut account = state
                .accounts
                .get(&bonus.user_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Account {} not found", bonus.user_id)))?;
            account.token_balance += bonus.amount;
            account.updated_at = stamp;
            rows.push(state.log_row(bonus, stamp)?);
            credited.push(account);
        }

        let Some(referral) = state.referrals.get_mut(code) else {
            return Ok(None);
        };
        referral.status = ReferralStatus::Completed;
        referral.referred_user_id = Some(redeemer_id);
        referral.completed_at = Some(now);
        let referral = referral.clone();

        for account in &credited {
            state.accounts.insert(account.id, account.clone());
        }
        state.transactions.extend(rows);

        Ok(Some(ReferralCompletion { referral, credited }))
    }
}
