//! PostgreSQL account store
//!
//! The business profile is stored as JSONB in its serialized (camelCase)
//! shape, which is the shape other subsystems read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{
    AccountId, AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_account::{Account, AccountStore, AccountType, BusinessProfile};

use crate::error::DatabaseError;

/// Account type as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_type", rename_all = "lowercase")]
pub enum AccountTypeDb {
    Individual,
    Business,
}

impl From<AccountType> for AccountTypeDb {
    fn from(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Individual => AccountTypeDb::Individual,
            AccountType::Business => AccountTypeDb::Business,
        }
    }
}

impl From<AccountTypeDb> for AccountType {
    fn from(account_type: AccountTypeDb) -> Self {
        match account_type {
            AccountTypeDb::Individual => AccountType::Individual,
            AccountTypeDb::Business => AccountType::Business,
        }
    }
}

/// Database row for an account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub account_id: Uuid,
    pub account_type: AccountTypeDb,
    pub display_name: String,
    pub email: Option<String>,
    pub business_profile: Option<Json<BusinessProfile>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DatabaseError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Account::from_parts(
            AccountId::from_uuid(row.account_id),
            row.account_type.into(),
            row.display_name,
            row.email,
            row.business_profile.map(|Json(profile)| profile),
            row.created_at,
            row.updated_at,
        )
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))
    }
}

/// PostgreSQL-backed implementation of [`AccountStore`]
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgAccountStore {}

#[async_trait]
impl HealthCheckable for PgAccountStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };
        HealthCheckResult {
            adapter_id: "postgres-account-store".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, PortError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT account_id, account_type, display_name, email, business_profile,
                   created_at, updated_at
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(row.map(Account::try_from).transpose()?)
    }

    async fn save_account(&self, account: &Account) -> Result<(), PortError> {
        account
            .validate()
            .map_err(|e| PortError::validation(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id, account_type, display_name, email, business_profile,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (account_id) DO UPDATE
            SET account_type = EXCLUDED.account_type,
                display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                business_profile = EXCLUDED.business_profile,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(*account.id.as_uuid())
        .bind(AccountTypeDb::from(account.account_type))
        .bind(&account.display_name)
        .bind(&account.email)
        .bind(account.business_profile.as_ref().map(Json))
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!(account_id = %account.id, account_type = %account.account_type.as_str(), "Account saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::TargetId;

    fn profile() -> BusinessProfile {
        BusinessProfile::new("Corner Bakery", "bakery", "12 Main St", TargetId::new("place-1").unwrap())
    }

    #[test]
    fn test_business_row_to_account() {
        let row = AccountRow {
            account_id: Uuid::new_v4(),
            account_type: AccountTypeDb::Business,
            display_name: "Dana".to_string(),
            email: None,
            business_profile: Some(Json(profile())),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let account = Account::try_from(row).unwrap();

        assert!(account.is_business());
        assert_eq!(account.business_profile, Some(profile()));
    }

    #[test]
    fn test_inconsistent_row_is_rejected() {
        let row = AccountRow {
            account_id: Uuid::new_v4(),
            account_type: AccountTypeDb::Individual,
            display_name: "Dana".to_string(),
            email: None,
            business_profile: Some(Json(profile())),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(matches!(
            Account::try_from(row),
            Err(DatabaseError::SerializationError(_))
        ));
    }
}
