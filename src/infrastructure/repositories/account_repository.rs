use super::transaction_repository::insert_transaction;
use crate::domain::account::{Account, PremiumTier};
use crate::domain::tokens::{GatedAction, NewTransaction};
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, Postgres};
use std::sync::Arc;
use uuid::Uuid;

/// Point reads and first-access creation of accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<Account>>;

    /// Returns the existing account or creates one with zeroed ledger fields
    async fn get_or_create(&self, user_id: Uuid, email: &str) -> AppResult<Account>;
}

/// Per-account counters and balance.
///
/// Every method is one atomic step: it either applies the change and returns
/// the updated account, or leaves everything untouched and returns `None`
/// (condition failed or account missing). Methods that move tokens take the
/// `NewTransaction` describing the move and append it in that same step, so a
/// balance change and its log row commit or fail together.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    async fn try_consume_free_use(
        &self,
        user_id: Uuid,
        action: GatedAction,
        cap: i32,
    ) -> AppResult<Option<Account>>;

    /// Applies the negative `entry.amount` only while the balance covers it
    async fn try_debit(&self, entry: NewTransaction) -> AppResult<Option<Account>>;

    async fn credit(&self, entry: NewTransaction) -> AppResult<Option<Account>>;

    /// Sets `has_rated_app` and credits `reward`, once per account
    async fn try_mark_rated(&self, reward: NewTransaction) -> AppResult<Option<Account>>;

    /// Stamps `last_daily_reward_at = now` and credits `reward` only when the
    /// previous claim is at least `cooldown` old (or absent)
    async fn try_claim_daily(
        &self,
        now: DateTime<Utc>,
        cooldown: Duration,
        reward: NewTransaction,
    ) -> AppResult<Option<Account>>;
}

/// Premium flag, tier and expiry.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    async fn set_premium(
        &self,
        user_id: Uuid,
        tier: PremiumTier,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Account>>;
}

pub struct AccountRepository {
    pool: Arc<DbPool>,
}

impl AccountRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<Account>> {
        let pool = self.pool.as_ref();
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(account)
    }

    async fn get_or_create(&self, user_id: Uuid, email: &str) -> AppResult<Account> {
        let pool = self.pool.as_ref();
        let now = Utc::now();

        // The no-op DO UPDATE makes RETURNING yield the existing row on conflict;
        // the stored email is kept as-is
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (id)
            DO UPDATE SET email = accounts.email
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }
}

#[async_trait]
impl UsageLedger for AccountRepository {
    async fn try_consume_free_use(
        &self,
        user_id: Uuid,
        action: GatedAction,
        cap: i32,
    ) -> AppResult<Option<Account>> {
        let pool = self.pool.as_ref();
        let sql = match action {
            GatedAction::Quiz => {
                r#"
                UPDATE accounts
                SET free_quizzes_used = free_quizzes_used + 1, updated_at = $3
                WHERE id = $1 AND free_quizzes_used < $2
                RETURNING *
                "#
            }
            GatedAction::Flashcard => {
                r#"
                UPDATE accounts
                SET free_flashcards_used = free_flashcards_used + 1, updated_at = $3
                WHERE id = $1 AND free_flashcards_used < $2
                RETURNING *
                "#
            }
        };

        let account = sqlx::query_as::<_, Account>(sql)
            .bind(user_id)
            .bind(cap)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await?;

        Ok(account)
    }

    async fn try_debit(&self, entry: NewTransaction) -> AppResult<Option<Account>> {
        let mut tx = self.pool.begin().await?;
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET token_balance = token_balance + $2, updated_at = $3
            WHERE id = $1 AND token_balance + $2 >= 0
            RETURNING *
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.amount)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        log_and_commit(tx, account, entry).await
    }

    async fn credit(&self, entry: NewTransaction) -> AppResult<Option<Account>> {
        let mut tx = self.pool.begin().await?;
        let account = credit_on(&mut *tx, entry).await?;
        if account.is_some() {
            tx.commit().await?;
        }

        Ok(account)
    }

    async fn try_mark_rated(&self, reward: NewTransaction) -> AppResult<Option<Account>> {
        let mut tx = self.pool.begin().await?;
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET has_rated_app = TRUE, token_balance = token_balance + $2, updated_at = $3
            WHERE id = $1 AND NOT has_rated_app
            RETURNING *
            "#,
        )
        .bind(reward.user_id)
        .bind(reward.amount)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        log_and_commit(tx, account, reward).await
    }

    async fn try_claim_daily(
        &self,
        now: DateTime<Utc>,
        cooldown: Duration,
        reward: NewTransaction,
    ) -> AppResult<Option<Account>> {
        let mut tx = self.pool.begin().await?;
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET last_daily_reward_at = $2, token_balance = token_balance + $4, updated_at = $2
            WHERE id = $1
              AND (last_daily_reward_at IS NULL OR last_daily_reward_at <= $3)
            RETURNING *
            "#,
        )
        .bind(reward.user_id)
        .bind(now)
        .bind(now - cooldown)
        .bind(reward.amount)
        .fetch_optional(&mut *tx)
        .await?;

        log_and_commit(tx, account, reward).await
    }
}

/// Credits `entry.amount` and logs `entry` on `conn`. The caller owns the
/// surrounding database transaction.
pub(super) async fn credit_on(
    conn: &mut PgConnection,
    entry: NewTransaction,
) -> AppResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET token_balance = token_balance + $2, updated_at = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(entry.user_id)
    .bind(entry.amount)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    if account.is_some() {
        insert_transaction(conn, entry).await?;
    }

    Ok(account)
}

/// Appends `entry` when the update matched, then commits. A failed append
/// drops `tx`, which rolls the update back.
async fn log_and_commit(
    mut tx: sqlx::Transaction<'static, Postgres>,
    account: Option<Account>,
    entry: NewTransaction,
) -> AppResult<Option<Account>> {
    if account.is_some() {
        insert_transaction(&mut *tx, entry).await?;
        tx.commit().await?;
    }

    Ok(account)
}

#[async_trait]
impl EntitlementStore for AccountRepository {
    async fn set_premium(
        &self,
        user_id: Uuid,
        tier: PremiumTier,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Account>> {
        let pool = self.pool.as_ref();
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET is_premium = TRUE, premium_tier = $2, premium_expires_at = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(tier)
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }
}
