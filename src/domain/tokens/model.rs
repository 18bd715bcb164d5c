use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// A feature that must pass an authorization check before it runs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GatedAction {
    Quiz,
    Flashcard,
}

impl GatedAction {
    pub fn transaction_kind(self) -> TransactionKind {
        match self {
            GatedAction::Quiz => TransactionKind::Quiz,
            GatedAction::Flashcard => TransactionKind::Flashcard,
        }
    }

    pub fn spend_description(self) -> &'static str {
        match self {
            GatedAction::Quiz => "Generated a quiz",
            GatedAction::Flashcard => "Generated flashcards",
        }
    }
}

impl std::fmt::Display for GatedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatedAction::Quiz => write!(f, "quiz"),
            GatedAction::Flashcard => write!(f, "flashcard"),
        }
    }
}

impl FromStr for GatedAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiz" | "quizzes" => Ok(GatedAction::Quiz),
            "flashcard" | "flashcards" => Ok(GatedAction::Flashcard),
            other => Err(format!("Unknown action: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Quiz,
    Flashcard,
    Reward,
    Referral,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Quiz => write!(f, "quiz"),
            TransactionKind::Flashcard => write!(f, "flashcard"),
            TransactionKind::Reward => write!(f, "reward"),
            TransactionKind::Referral => write!(f, "referral"),
        }
    }
}

/// Append-only audit row. Negative amounts are spends, positive amounts grants.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TokenTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i32,
    pub transaction_type: TransactionKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub amount: i32,
    pub kind: TransactionKind,
    pub description: String,
}

impl NewTransaction {
    pub fn into_transaction(self, now: DateTime<Utc>) -> TokenTransaction {
        TokenTransaction {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            amount: self.amount,
            transaction_type: self.kind,
            description: self.description,
            created_at: now,
        }
    }
}

/// Which path let a gated action through
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessPath {
    Premium,
    FreeUse,
    Tokens,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    InsufficientTokens { balance: i32, required: i32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Authorization {
    Allowed { via: AccessPath },
    Denied(DenialReason),
    Unauthorized,
}

impl Authorization {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Authorization::Allowed { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FreeUseOutcome {
    Consumed { remaining: i32 },
    CapReached,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpendOutcome {
    Spent { amount: i32, balance: i32 },
    InsufficientTokens { balance: i32, required: i32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GrantOutcome {
    Granted { amount: i32, balance: i32 },
    /// Premium accounts do not collect tokens
    NoOp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DailyRewardOutcome {
    Granted { amount: i32, balance: i32 },
    AlreadyClaimed { hours_remaining: i64 },
    NoOp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RatingOutcome {
    Granted { amount: i32, balance: i32 },
    AlreadyRated,
    NoOp,
}
