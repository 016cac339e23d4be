//! Ownership Claim Ports
//!
//! Interfaces to the collaborators the claim lifecycle depends on:
//!
//! - [`ClaimStore`] / [`ClaimTransaction`]: persistent claims with an atomic
//!   read-check-write unit of work
//! - [`PlaceLookupPort`]: the external place provider, used only at conversion
//! - [`NotificationPort`]: best-effort messages to claimants
//! - [`ReviewerDirectory`]: who holds the reviewer capability
//!
//! # Transactions
//!
//! Every write that depends on a guard decision follows the same shape:
//!
//! ```rust,ignore
//! let mut tx = store.begin().await?;
//! let claims_on_target = tx.lock_target(&target_id).await?;
//! ExclusivityGuard::check_submit(claimant_id, &target_id, &claims_on_target)?;
//! tx.insert(&claim).await?;
//! tx.commit().await?;
//! ```
//!
//! `lock_target` serializes all transactions touching the same listing until
//! commit or drop, so the guard decision cannot be invalidated between the
//! read and the write. Dropping a transaction without committing discards
//! its writes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{
    AccountId, ClaimId, DomainPort, HealthCheckable, OperationMetadata, PortError, TargetId,
};

use crate::claim::{Claim, ClaimStatus, ClaimantContact};

/// Persistent record of claims
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    /// Opens a unit of work
    async fn begin(&self) -> Result<Box<dyn ClaimTransaction>, PortError>;

    /// Reads a claim outside any transaction
    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, PortError>;

    /// Claims submitted by a claimant, newest first
    async fn list_by_claimant(&self, claimant_id: AccountId) -> Result<Vec<Claim>, PortError>;

    /// Claims on a listing, newest first
    async fn list_by_target(&self, target_id: &TargetId) -> Result<Vec<Claim>, PortError>;

    /// All claims, optionally filtered by status, newest first
    async fn list(&self, status: Option<ClaimStatus>) -> Result<Vec<Claim>, PortError>;
}

/// Atomic unit of work against the claim store
#[async_trait]
pub trait ClaimTransaction: Send {
    /// Reads a claim inside the transaction
    async fn find(&mut self, id: ClaimId) -> Result<Option<Claim>, PortError>;

    /// Locks the listing and returns every claim currently on it
    async fn lock_target(&mut self, target_id: &TargetId) -> Result<Vec<Claim>, PortError>;

    async fn insert(&mut self, claim: &Claim) -> Result<(), PortError>;

    async fn update(&mut self, claim: &Claim) -> Result<(), PortError>;

    async fn delete(&mut self, id: ClaimId) -> Result<(), PortError>;

    /// Makes all writes visible atomically
    async fn commit(self: Box<Self>) -> Result<(), PortError>;
}

/// Coordinates of a listing as reported by the place provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Listing details returned by the place provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    pub name: String,
    pub address: String,
    pub category: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
    #[serde(default)]
    pub photo_ref: Option<String>,
}

/// External place-lookup provider
#[async_trait]
pub trait PlaceLookupPort: DomainPort + HealthCheckable {
    /// Fetches current details of a listing
    ///
    /// Returns `PortError::NotFound` when the listing no longer resolves and a
    /// transient error when the provider cannot be reached.
    async fn lookup_target(
        &self,
        target_id: &TargetId,
        metadata: Option<OperationMetadata>,
    ) -> Result<PlaceDetails, PortError>;
}

/// Outcome reported to the claimant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

/// Message sent to a claimant after a review decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewNotice {
    pub claim_id: ClaimId,
    pub recipient: ClaimantContact,
    pub target_name: String,
    pub decision: ReviewDecision,
    pub notes: Option<String>,
}

impl ReviewNotice {
    /// Builds the notice for a claim that was just reviewed
    ///
    /// Returns `None` for pending claims.
    pub fn for_claim(claim: &Claim) -> Option<Self> {
        let decision = match claim.status {
            ClaimStatus::Approved => ReviewDecision::Approved,
            ClaimStatus::Rejected => ReviewDecision::Rejected,
            ClaimStatus::Pending => return None,
        };

        Some(Self {
            claim_id: claim.id,
            recipient: claim.claimant_contact.clone(),
            target_name: claim.target_snapshot.name.clone(),
            decision,
            notes: claim.review_notes.clone().filter(|n| !n.is_empty()),
        })
    }

    /// Plain-text subject line
    pub fn subject(&self) -> String {
        match self.decision {
            ReviewDecision::Approved => format!("Your claim for {} was approved", self.target_name),
            ReviewDecision::Rejected => format!("Your claim for {} was not approved", self.target_name),
        }
    }
}

/// Outbound notification channel (email, push, ...)
#[async_trait]
pub trait NotificationPort: DomainPort {
    async fn dispatch(&self, notice: &ReviewNotice) -> Result<(), PortError>;
}

/// Authorization collaborator deciding who may review claims
#[async_trait]
pub trait ReviewerDirectory: DomainPort {
    async fn is_reviewer(&self, account_id: AccountId) -> Result<bool, PortError>;
}
