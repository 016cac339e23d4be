//! Account Store Port
//!
//! The Conversion Engine reads and writes accounts through [`AccountStore`].
//! Adapters:
//!
//! - **PostgreSQL**: `infra_db::repositories::PgAccountStore`
//! - **In-memory**: [`InMemoryAccountStore`], for tests and local runs
//!
//! `save_account` is a whole-row upsert. Callers compute the full account
//! and write it back; concurrent writers of the same computed value resolve
//! as last-writer-wins.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use core_kernel::{
    AccountId, AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};

use crate::account::Account;

/// Persistent record of user accounts
#[async_trait]
pub trait AccountStore: DomainPort + HealthCheckable {
    /// Retrieves an account, `None` if the user has not onboarded yet
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, PortError>;

    /// Inserts or replaces an account
    async fn save_account(&self, account: &Account) -> Result<(), PortError>;
}

/// In-memory implementation of [`AccountStore`]
#[derive(Debug, Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl InMemoryAccountStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates with accounts
    pub async fn with_accounts(accounts: Vec<Account>) -> Self {
        let store = Self::new();
        {
            let mut map = store.accounts.write().await;
            for account in accounts {
                map.insert(account.id, account);
            }
        }
        store
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

impl DomainPort for InMemoryAccountStore {}

#[async_trait]
impl HealthCheckable for InMemoryAccountStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "in-memory-account-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, PortError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn save_account(&self, account: &Account) -> Result<(), PortError> {
        account
            .validate()
            .map_err(|e| PortError::validation(e.to_string()))?;
        self.accounts.write().await.insert(account.id, account.clone());
        tracing::debug!(account_id = %account.id, "Account saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_get() {
        let store = InMemoryAccountStore::new();
        let account = Account::new_individual(AccountId::new(), "Dana", None);

        store.save_account(&account).await.unwrap();

        assert_eq!(store.get_account(account.id).await.unwrap(), Some(account));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_rejects_inconsistent_account() {
        let store = InMemoryAccountStore::new();
        let mut account = Account::new_individual(AccountId::new(), "Dana", None);
        account.account_type = crate::AccountType::Business;

        let result = store.save_account(&account).await;

        assert!(matches!(result, Err(PortError::Validation { .. })));
        assert!(store.is_empty().await);
    }
}
