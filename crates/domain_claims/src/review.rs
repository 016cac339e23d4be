//! Review Authority
//!
//! Gated state transitions on claims. Every operation first asks the
//! [`ReviewerDirectory`] whether the caller holds the reviewer capability,
//! then performs the transition inside a claim transaction that holds the
//! listing lock.

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::{AccountId, ClaimId};

use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;
use crate::guard::{lock_claim, ExclusivityGuard};
use crate::ports::{ClaimStore, ReviewerDirectory};

/// Approves, rejects and revokes claims
#[derive(Clone)]
pub struct ReviewAuthority {
    store: Arc<dyn ClaimStore>,
    reviewers: Arc<dyn ReviewerDirectory>,
}

impl ReviewAuthority {
    pub fn new(store: Arc<dyn ClaimStore>, reviewers: Arc<dyn ReviewerDirectory>) -> Self {
        Self { store, reviewers }
    }

    /// Fails with `Unauthorized` unless `actor` holds the reviewer capability
    pub async fn ensure_reviewer(&self, actor: AccountId) -> Result<(), ClaimError> {
        if self.reviewers.is_reviewer(actor).await? {
            Ok(())
        } else {
            warn!(actor = %actor, "Reviewer capability check failed");
            Err(ClaimError::unauthorized(format!("{} is not a claim reviewer", actor)))
        }
    }

    /// Whether `actor` holds the reviewer capability
    pub async fn is_reviewer(&self, actor: AccountId) -> Result<bool, ClaimError> {
        Ok(self.reviewers.is_reviewer(actor).await?)
    }

    /// Approves a pending claim
    ///
    /// When another claim on the listing is already approved this fails with
    /// `TargetAlreadyClaimed` and the claim stays pending with no provenance
    /// written. The approval is final once committed; conversion is a
    /// separate step.
    pub async fn approve(
        &self,
        claim_id: ClaimId,
        reviewer_id: AccountId,
        notes: Option<String>,
    ) -> Result<Claim, ClaimError> {
        self.ensure_reviewer(reviewer_id).await?;

        let mut tx = self.store.begin().await?;
        let (mut claim, claims_on_target) = lock_claim(&mut tx, claim_id).await?;
        claim.ensure_status(ClaimStatus::Pending, "approve")?;

        if let Err(conflict) = ExclusivityGuard::check_approve(&claim, &claims_on_target) {
            warn!(
                claim_id = %claim_id,
                target_id = %claim.target_id,
                reviewer_id = %reviewer_id,
                reason = %conflict,
                "Approval rejected by exclusivity guard"
            );
            return Err(conflict);
        }

        claim.approve(reviewer_id, notes.map(|n| n.trim().to_string()))?;
        tx.update(&claim).await?;
        tx.commit().await?;

        info!(
            claim_id = %claim_id,
            target_id = %claim.target_id,
            reviewer_id = %reviewer_id,
            "Ownership claim approved"
        );
        Ok(claim)
    }

    /// Rejects a pending claim; notes are mandatory
    pub async fn reject(
        &self,
        claim_id: ClaimId,
        reviewer_id: AccountId,
        notes: &str,
    ) -> Result<Claim, ClaimError> {
        if notes.trim().is_empty() {
            return Err(ClaimError::NotesRequired);
        }
        self.ensure_reviewer(reviewer_id).await?;

        let mut tx = self.store.begin().await?;
        let (mut claim, _) = lock_claim(&mut tx, claim_id).await?;
        claim.reject(reviewer_id, notes)?;
        tx.update(&claim).await?;
        tx.commit().await?;

        info!(claim_id = %claim_id, reviewer_id = %reviewer_id, "Ownership claim rejected");
        Ok(claim)
    }

    /// Withdraws an approval
    ///
    /// With `hard_delete` the record is removed entirely. Otherwise the claim
    /// becomes `rejected` with a `revoked:` note. The claimant's business
    /// profile is left as it is either way.
    pub async fn revoke(
        &self,
        claim_id: ClaimId,
        revoker_id: AccountId,
        reason: &str,
        hard_delete: bool,
    ) -> Result<(), ClaimError> {
        if reason.trim().is_empty() {
            return Err(ClaimError::NotesRequired);
        }
        self.ensure_reviewer(revoker_id).await?;

        let mut tx = self.store.begin().await?;
        let (mut claim, _) = lock_claim(&mut tx, claim_id).await?;
        claim.ensure_status(ClaimStatus::Approved, "revoke")?;

        if hard_delete {
            tx.delete(claim_id).await?;
        } else {
            claim.revoke(revoker_id, reason)?;
            tx.update(&claim).await?;
        }
        tx.commit().await?;

        info!(
            claim_id = %claim_id,
            target_id = %claim.target_id,
            revoker_id = %revoker_id,
            hard_delete,
            "Ownership claim revoked"
        );
        Ok(())
    }

    /// Deletes a rejected claim record
    pub async fn purge_rejected(&self, claim_id: ClaimId, admin_id: AccountId) -> Result<(), ClaimError> {
        self.ensure_reviewer(admin_id).await?;

        let mut tx = self.store.begin().await?;
        let (claim, _) = lock_claim(&mut tx, claim_id).await?;
        claim.ensure_status(ClaimStatus::Rejected, "purge")?;
        tx.delete(claim_id).await?;
        tx.commit().await?;

        info!(claim_id = %claim_id, admin_id = %admin_id, "Rejected claim purged");
        Ok(())
    }
}
