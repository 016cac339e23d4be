//! Claimant-facing submission and withdrawal

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use core_kernel::{AccountId, ClaimId, TargetId};

use crate::claim::{Claim, ClaimStatus, ClaimantContact, TargetSnapshot, Verification};
use crate::error::ClaimError;
use crate::guard::{lock_claim, ExclusivityGuard};
use crate::ports::ClaimStore;

/// Everything a claimant supplies when asserting ownership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimRequest {
    pub claimant_id: AccountId,
    pub contact: ClaimantContact,
    pub target_id: TargetId,
    pub target_snapshot: TargetSnapshot,
    pub verification: Verification,
}

/// Creates and withdraws claims
#[derive(Clone)]
pub struct ClaimSubmissions {
    store: Arc<dyn ClaimStore>,
}

impl ClaimSubmissions {
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        Self { store }
    }

    /// Records a new pending claim
    ///
    /// The exclusivity check and the insert share one transaction holding the
    /// listing lock, so two concurrent submissions cannot both pass.
    pub async fn submit(&self, request: SubmitClaimRequest) -> Result<Claim, ClaimError> {
        let claim = Claim::submit(
            request.claimant_id,
            request.contact,
            request.target_id,
            request.target_snapshot,
            request.verification,
        )?;

        let mut tx = self.store.begin().await?;
        let claims_on_target = tx.lock_target(&claim.target_id).await?;

        if let Err(conflict) =
            ExclusivityGuard::check_submit(claim.claimant_id, &claim.target_id, &claims_on_target)
        {
            warn!(
                claimant_id = %claim.claimant_id,
                target_id = %claim.target_id,
                reason = %conflict,
                "Claim submission rejected"
            );
            return Err(conflict);
        }

        tx.insert(&claim).await?;
        tx.commit().await?;

        info!(
            claim_id = %claim.id,
            claimant_id = %claim.claimant_id,
            target_id = %claim.target_id,
            "Ownership claim submitted"
        );
        Ok(claim)
    }

    /// Removes a pending claim on behalf of its claimant
    pub async fn withdraw(&self, claim_id: ClaimId, claimant_id: AccountId) -> Result<(), ClaimError> {
        let mut tx = self.store.begin().await?;
        let (claim, _) = lock_claim(&mut tx, claim_id).await?;

        if claim.claimant_id != claimant_id {
            return Err(ClaimError::unauthorized(format!(
                "only the claimant may withdraw claim {}",
                claim_id
            )));
        }
        claim.ensure_status(ClaimStatus::Pending, "withdraw")?;

        tx.delete(claim_id).await?;
        tx.commit().await?;

        info!(claim_id = %claim_id, claimant_id = %claimant_id, "Ownership claim withdrawn");
        Ok(())
    }
}
