pub mod account_repository;
pub mod memory;
pub mod referral_repository;
pub mod transaction_repository;

pub use account_repository::{AccountRepository, AccountStore, EntitlementStore, UsageLedger};
pub use memory::InMemoryStore;
pub use referral_repository::{ReferralCompletion, ReferralRepository, ReferralStore};
pub use transaction_repository::{TransactionLog, TransactionRepository};

use crate::infrastructure::db::DbPool;
use std::sync::Arc;

/// Every store the services depend on, behind their trait objects
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountStore>,
    pub ledger: Arc<dyn UsageLedger>,
    pub entitlements: Arc<dyn EntitlementStore>,
    pub transactions: Arc<dyn TransactionLog>,
    pub referrals: Arc<dyn ReferralStore>,
    /// Present only for the Postgres backend; used by the readiness probe
    pub pool: Option<Arc<DbPool>>,
}

impl Repositories {
    pub fn postgres(pool: Arc<DbPool>) -> Self {
        let account_repo = Arc::new(AccountRepository::new(pool.clone()));
        Self {
            accounts: account_repo.clone(),
            ledger: account_repo.clone(),
            entitlements: account_repo,
            transactions: Arc::new(TransactionRepository::new(pool.clone())),
            referrals: Arc::new(ReferralRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            accounts: store.clone(),
            ledger: store.clone(),
            entitlements: store.clone(),
            transactions: store.clone(),
            referrals: store,
            pool: None,
        }
    }
}
