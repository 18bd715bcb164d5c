use chrono::{Duration, Utc};
use std::sync::Arc;
use tokengate_backend::domain::account::{Account, PremiumTier};
use tokengate_backend::infrastructure::repositories::InMemoryStore;
use uuid::Uuid;

pub struct TestFixtures {
    store: Arc<InMemoryStore>,
}

impl TestFixtures {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }

    pub fn create_account(&self, email: &str) -> Account {
        self.create_account_with(email, |_| {})
    }

    pub fn create_account_with(&self, email: &str, configure: impl FnOnce(&mut Account)) -> Account {
        let mut account = Account::new(Uuid::new_v4(), email, Utc::now());
        configure(&mut account);
        self.store.insert_account(account.clone());
        account
    }

    pub fn create_premium_account(&self, email: &str) -> Account {
        self.create_account_with(email, |account| {
            account.is_premium = true;
            account.premium_tier = Some(PremiumTier::Monthly);
            account.premium_expires_at = Some(Utc::now() + Duration::days(30));
        })
    }

    pub fn create_expired_premium_account(&self, email: &str) -> Account {
        self.create_account_with(email, |account| {
            account.is_premium = true;
            account.premium_tier = Some(PremiumTier::Monthly);
            account.premium_expires_at = Some(Utc::now() - Duration::days(1));
        })
    }

    pub fn balance(&self, user_id: Uuid) -> i32 {
        self.store
            .account(user_id)
            .map(|a| a.token_balance)
            .unwrap_or_default()
    }
}
