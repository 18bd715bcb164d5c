use crate::domain::tokens::{NewTransaction, TokenTransaction};
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgConnection;
use std::sync::Arc;
use uuid::Uuid;

/// Read side of the append-only token audit log.
///
/// Rows are written only by `UsageLedger`, in the same atomic step as the
/// balance change they describe, and are never updated or deleted.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Most recent first
    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<TokenTransaction>>;
}

pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

/// Inserts one log row on `conn`, which may be an open database transaction
pub(super) async fn insert_transaction(
    conn: &mut PgConnection,
    tx: NewTransaction,
) -> AppResult<TokenTransaction> {
    let row = tx.into_transaction(Utc::now());

    let inserted = sqlx::query_as::<_, TokenTransaction>(
        r#"
        INSERT INTO token_transactions (id, user_id, amount, transaction_type, description, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, amount, transaction_type, description, created_at
        "#,
    )
    .bind(row.id)
    .bind(row.user_id)
    .bind(row.amount)
    .bind(row.transaction_type)
    .bind(&row.description)
    .bind(row.created_at)
    .fetch_one(conn)
    .await?;

    Ok(inserted)
}

#[async_trait]
impl TransactionLog for TransactionRepository {
    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<TokenTransaction>> {
        let pool = self.pool.as_ref();
        let records = sqlx::query_as::<_, TokenTransaction>(
            r#"
            SELECT id, user_id, amount, transaction_type, description, created_at
            FROM token_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
