use super::account_repository::credit_on;
use crate::domain::account::Account;
use crate::domain::referral::ReferralCode;
use crate::domain::tokens::NewTransaction;
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// A completed code together with the accounts its bonuses were credited to
#[derive(Debug, Clone)]
pub struct ReferralCompletion {
    pub referral: ReferralCode,
    pub credited: Vec<Account>,
}

#[async_trait]
pub trait ReferralStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<ReferralCode>>;

    async fn find_by_referrer(&self, referrer_id: Uuid) -> AppResult<Option<ReferralCode>>;

    /// Whether the user has ever completed a redemption
    async fn has_redeemed(&self, user_id: Uuid) -> AppResult<bool>;

    /// Returns `false` without inserting when the code or the referrer already exists
    async fn insert(&self, referral: &ReferralCode) -> AppResult<bool>;

    /// Marks a pending code completed by `redeemer_id` and credits every
    /// entry in `bonuses` (balance plus log row), all in one atomic step.
    ///
    /// `None` when the code is missing, already completed, or the redeemer
    /// already holds a redemption. On error nothing is applied and the code
    /// stays pending.
    async fn complete(
        &self,
        code: &str,
        redeemer_id: Uuid,
        now: DateTime<Utc>,
        bonuses: Vec<NewTransaction>,
    ) -> AppResult<Option<ReferralCompletion>>;
}

pub struct ReferralRepository {
    pool: Arc<DbPool>,
}

impl ReferralRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferralStore for ReferralRepository {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<ReferralCode>> {
        let pool = self.pool.as_ref();
        let referral = sqlx::query_as::<_, ReferralCode>(
            "SELECT * FROM referrals WHERE referral_code = $1",
        )
        .bind(code)
        .fetch_optional(pool)
        .await?;

        Ok(referral)
    }

    async fn find_by_referrer(&self, referrer_id: Uuid) -> AppResult<Option<ReferralCode>> {
        let pool = self.pool.as_ref();
        let referral =
            sqlx::query_as::<_, ReferralCode>("SELECT * FROM referrals WHERE referrer_id = $1")
                .bind(referrer_id)
                .fetch_optional(pool)
                .await?;

        Ok(referral)
    }

    async fn has_redeemed(&self, user_id: Uuid) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM referrals WHERE referred_user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists.0)
    }

    async fn insert(&self, referral: &ReferralCode) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            INSERT INTO referrals (id, referral_code, referrer_id, referred_user_id, status, completed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(referral.id)
        .bind(&referral.referral_code)
        .bind(referral.referrer_id)
        .bind(referral.referred_user_id)
        .bind(referral.status)
        .bind(referral.completed_at)
        .bind(referral.created_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn complete(
        &self,
        code: &str,
        redeemer_id: Uuid,
        now: DateTime<Utc>,
        bonuses: Vec<NewTransaction>,
    ) -> AppResult<Option<ReferralCompletion>> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query_as::<_, ReferralCode>(
            r#"
            UPDATE referrals
            SET status = 'completed', referred_user_id = $2, completed_at = $3
            WHERE referral_code = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(redeemer_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await;

        let referral = match result {
            Ok(Some(referral)) => referral,
            Ok(None) => return Ok(None),
            // Unique index on referred_user_id: a concurrent redemption by the same user won
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut credited = Vec::with_capacity(bonuses.len());
        for bonus in bonuses {
            let user_id = bonus.user_id;
            let account = credit_on(&mut *tx, bonus)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Account {} not found", user_id)))?;
            credited.push(account);
        }
        tx.commit().await?;

        Ok(Some(ReferralCompletion { referral, credited }))
    }
}
