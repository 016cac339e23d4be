//! PostgreSQL ownership claim store
//!
//! Implements `ClaimStore` over the `ownership_claims` table.
//!
//! # Locking
//!
//! `lock_target` takes a transaction-scoped advisory lock keyed by the
//! listing id, then reads the listing's rows `FOR UPDATE`. The advisory lock
//! also covers listings with no rows yet, which row locks alone cannot. Both
//! are released on commit or rollback. The partial unique indexes in the
//! schema reject anything that slips past the lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use core_kernel::{
    AccountId, AdapterHealth, ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
    TargetId,
};
use domain_claims::{
    Claim, ClaimStatus, ClaimStore, ClaimTransaction, ClaimantContact, TargetSnapshot, Verification,
};

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = r#"
    claim_id,
    claimant_id,
    claimant_display_name,
    claimant_email,
    target_id,
    target_name,
    target_address,
    target_category,
    verification_role,
    verification_business_phone,
    verification_business_email,
    verification_justification,
    status,
    submitted_at,
    reviewed_at,
    reviewer_id,
    review_notes,
    revoked_at,
    converted_at
"#;

const NEWEST_FIRST: &str = "ORDER BY submitted_at DESC, claim_id DESC";

/// Claim status as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "ownership_claim_status", rename_all = "lowercase")]
pub enum ClaimStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<ClaimStatus> for ClaimStatusDb {
    fn from(status: ClaimStatus) -> Self {
        match status {
            ClaimStatus::Pending => ClaimStatusDb::Pending,
            ClaimStatus::Approved => ClaimStatusDb::Approved,
            ClaimStatus::Rejected => ClaimStatusDb::Rejected,
        }
    }
}

impl From<ClaimStatusDb> for ClaimStatus {
    fn from(status: ClaimStatusDb) -> Self {
        match status {
            ClaimStatusDb::Pending => ClaimStatus::Pending,
            ClaimStatusDb::Approved => ClaimStatus::Approved,
            ClaimStatusDb::Rejected => ClaimStatus::Rejected,
        }
    }
}

/// Database row for an ownership claim
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub claim_id: Uuid,
    pub claimant_id: Uuid,
    pub claimant_display_name: String,
    pub claimant_email: String,
    pub target_id: String,
    pub target_name: String,
    pub target_address: String,
    pub target_category: String,
    pub verification_role: Option<String>,
    pub verification_business_phone: Option<String>,
    pub verification_business_email: Option<String>,
    pub verification_justification: Option<String>,
    pub status: ClaimStatusDb,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewer_id: Option<Uuid>,
    pub review_notes: Option<String>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub converted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let target_id = TargetId::new(row.target_id)
            .map_err(|e| DatabaseError::SerializationError(format!("claim {}: {}", row.claim_id, e)))?;

        Ok(Claim {
            id: ClaimId::from_uuid(row.claim_id),
            claimant_id: AccountId::from_uuid(row.claimant_id),
            claimant_contact: ClaimantContact {
                display_name: row.claimant_display_name,
                email: row.claimant_email,
            },
            target_id,
            target_snapshot: TargetSnapshot {
                name: row.target_name,
                address: row.target_address,
                category: row.target_category,
            },
            verification: Verification {
                role: row.verification_role,
                business_phone: row.verification_business_phone,
                business_email: row.verification_business_email,
                justification: row.verification_justification,
            },
            status: row.status.into(),
            submitted_at: row.submitted_at,
            reviewed_at: row.reviewed_at,
            reviewer_id: row.reviewer_id.map(AccountId::from_uuid),
            review_notes: row.review_notes,
            revoked_at: row.revoked_at,
            converted_at: row.converted_at,
        })
    }
}

fn to_claims(rows: Vec<ClaimRow>) -> Result<Vec<Claim>, PortError> {
    rows.into_iter()
        .map(|row| Claim::try_from(row).map_err(PortError::from))
        .collect()
}

fn db_error(error: sqlx::Error) -> PortError {
    DatabaseError::from(error).into()
}

/// PostgreSQL-backed implementation of [`ClaimStore`]
#[derive(Debug, Clone)]
pub struct PgClaimStore {
    pool: PgPool,
}

impl PgClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select(&self, filter: &str, bind: Option<SelectBind<'_>>) -> Result<Vec<Claim>, PortError> {
        let sql = format!("SELECT {} FROM ownership_claims {} {}", CLAIM_COLUMNS, filter, NEWEST_FIRST);
        let query = sqlx::query_as::<_, ClaimRow>(&sql);
        let query = match bind {
            Some(SelectBind::Uuid(value)) => query.bind(value),
            Some(SelectBind::Text(value)) => query.bind(value),
            Some(SelectBind::Status(value)) => query.bind(value),
            None => query,
        };
        let rows = query.fetch_all(&self.pool).await.map_err(db_error)?;
        to_claims(rows)
    }
}

enum SelectBind<'a> {
    Uuid(Uuid),
    Text(&'a str),
    Status(ClaimStatusDb),
}

impl DomainPort for PgClaimStore {}

#[async_trait]
impl HealthCheckable for PgClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM ownership_claims WHERE false")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };
        HealthCheckResult {
            adapter_id: "postgres-claim-store".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ClaimStore for PgClaimStore {
    async fn begin(&self) -> Result<Box<dyn ClaimTransaction>, PortError> {
        let tx = self.pool.begin().await.map_err(db_error)?;
        Ok(Box::new(PgClaimTransaction { tx }))
    }

    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        let sql = format!("SELECT {} FROM ownership_claims WHERE claim_id = $1", CLAIM_COLUMNS);
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(|r| Claim::try_from(r).map_err(PortError::from)).transpose()
    }

    async fn list_by_claimant(&self, claimant_id: AccountId) -> Result<Vec<Claim>, PortError> {
        self.select("WHERE claimant_id = $1", Some(SelectBind::Uuid(*claimant_id.as_uuid())))
            .await
    }

    async fn list_by_target(&self, target_id: &TargetId) -> Result<Vec<Claim>, PortError> {
        self.select("WHERE target_id = $1", Some(SelectBind::Text(target_id.as_str())))
            .await
    }

    async fn list(&self, status: Option<ClaimStatus>) -> Result<Vec<Claim>, PortError> {
        match status {
            Some(status) => {
                self.select("WHERE status = $1", Some(SelectBind::Status(status.into())))
                    .await
            }
            None => self.select("", None).await,
        }
    }
}

/// A claim unit of work on one database transaction
pub struct PgClaimTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ClaimTransaction for PgClaimTransaction {
    async fn find(&mut self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        let sql = format!("SELECT {} FROM ownership_claims WHERE claim_id = $1", CLAIM_COLUMNS);
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error)?;
        row.map(|r| Claim::try_from(r).map_err(PortError::from)).transpose()
    }

    async fn lock_target(&mut self, target_id: &TargetId) -> Result<Vec<Claim>, PortError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(target_id.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error)?;

        let sql = format!(
            "SELECT {} FROM ownership_claims WHERE target_id = $1 {} FOR UPDATE",
            CLAIM_COLUMNS, NEWEST_FIRST
        );
        let rows = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(target_id.as_str())
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error)?;

        debug!(target_id = %target_id, claims = rows.len(), "Listing locked");
        to_claims(rows)
    }

    async fn insert(&mut self, claim: &Claim) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO ownership_claims (
                claim_id, claimant_id, claimant_display_name, claimant_email,
                target_id, target_name, target_address, target_category,
                verification_role, verification_business_phone,
                verification_business_email, verification_justification,
                status, submitted_at, reviewed_at, reviewer_id, review_notes,
                revoked_at, converted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(*claim.id.as_uuid())
        .bind(*claim.claimant_id.as_uuid())
        .bind(&claim.claimant_contact.display_name)
        .bind(&claim.claimant_contact.email)
        .bind(claim.target_id.as_str())
        .bind(&claim.target_snapshot.name)
        .bind(&claim.target_snapshot.address)
        .bind(&claim.target_snapshot.category)
        .bind(&claim.verification.role)
        .bind(&claim.verification.business_phone)
        .bind(&claim.verification.business_email)
        .bind(&claim.verification.justification)
        .bind(ClaimStatusDb::from(claim.status))
        .bind(claim.submitted_at)
        .bind(claim.reviewed_at)
        .bind(claim.reviewer_id.map(|id| *id.as_uuid()))
        .bind(&claim.review_notes)
        .bind(claim.revoked_at)
        .bind(claim.converted_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn update(&mut self, claim: &Claim) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE ownership_claims
            SET status = $2,
                reviewed_at = $3,
                reviewer_id = $4,
                review_notes = $5,
                revoked_at = $6,
                converted_at = $7
            WHERE claim_id = $1
            "#,
        )
        .bind(*claim.id.as_uuid())
        .bind(ClaimStatusDb::from(claim.status))
        .bind(claim.reviewed_at)
        .bind(claim.reviewer_id.map(|id| *id.as_uuid()))
        .bind(&claim.review_notes)
        .bind(claim.revoked_at)
        .bind(claim.converted_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Claim", claim.id));
        }
        Ok(())
    }

    async fn delete(&mut self, id: ClaimId) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM ownership_claims WHERE claim_id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Claim", id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tx.commit().await.map_err(db_error)
    }
}
