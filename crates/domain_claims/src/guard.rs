//! Exclusivity Guard
//!
//! Decides whether a submission or an approval is admissible:
//!
//! - a listing has at most one approved claim
//! - a claimant has at most one pending claim per listing
//!
//! The `check_*` functions are pure and take the claims currently on the
//! listing. Writers call them between `ClaimTransaction::lock_target` and
//! `commit`; the store-backed `can_*` methods run the same checks against a
//! plain read and are only advisory.

use std::sync::Arc;

use tracing::debug;

use core_kernel::{AccountId, ClaimId, TargetId};

use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;
use crate::ports::{ClaimStore, ClaimTransaction};

/// Loads a claim and locks its listing
///
/// Returns the claim as seen under the lock together with every claim on
/// the same listing. The claim's listing never changes, so reading it
/// before taking the lock is safe.
pub(crate) async fn lock_claim(
    tx: &mut Box<dyn ClaimTransaction>,
    claim_id: ClaimId,
) -> Result<(Claim, Vec<Claim>), ClaimError> {
    let target_id = tx
        .find(claim_id)
        .await?
        .ok_or(ClaimError::NotFound(claim_id))?
        .target_id;
    let claims_on_target = tx.lock_target(&target_id).await?;
    let claim = claims_on_target
        .iter()
        .find(|c| c.id == claim_id)
        .cloned()
        .ok_or(ClaimError::NotFound(claim_id))?;
    Ok((claim, claims_on_target))
}

/// Guard over the claim exclusivity invariants
#[derive(Clone)]
pub struct ExclusivityGuard {
    store: Arc<dyn ClaimStore>,
}

impl ExclusivityGuard {
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        Self { store }
    }

    /// Side-effect-free pre-check for a submission
    pub async fn can_submit(&self, claimant_id: AccountId, target_id: &TargetId) -> Result<(), ClaimError> {
        let claims = self.store.list_by_target(target_id).await?;
        Self::check_submit(claimant_id, target_id, &claims)
    }

    /// Side-effect-free pre-check for an approval
    pub async fn can_approve(&self, claim_id: ClaimId) -> Result<(), ClaimError> {
        let claim = self
            .store
            .get(claim_id)
            .await?
            .ok_or(ClaimError::NotFound(claim_id))?;
        let claims = self.store.list_by_target(&claim.target_id).await?;
        Self::check_approve(&claim, &claims)
    }

    /// Rejects a submission that would duplicate a pending claim or target a claimed listing
    pub fn check_submit(
        claimant_id: AccountId,
        target_id: &TargetId,
        claims_on_target: &[Claim],
    ) -> Result<(), ClaimError> {
        let mut on_target = claims_on_target.iter().filter(|c| &c.target_id == target_id);

        if let Some(claim) = on_target
            .clone()
            .find(|c| c.claimant_id == claimant_id && c.status == ClaimStatus::Pending)
        {
            debug!(claim_id = %claim.id, "Duplicate pending claim found");
            return Err(ClaimError::DuplicatePending {
                claimant_id,
                target_id: target_id.clone(),
                existing_claim_id: claim.id,
            });
        }

        if let Some(claim) = on_target.find(|c| c.status == ClaimStatus::Approved) {
            return Err(ClaimError::TargetAlreadyClaimed {
                target_id: target_id.clone(),
                approved_claim_id: claim.id,
            });
        }

        Ok(())
    }

    /// Rejects an approval when another claim on the listing is already approved
    ///
    /// Evaluated against current state only: a listing whose previous
    /// approval was revoked is free again.
    pub fn check_approve(candidate: &Claim, claims_on_target: &[Claim]) -> Result<(), ClaimError> {
        let holder = claims_on_target.iter().find(|c| {
            c.target_id == candidate.target_id && c.id != candidate.id && c.status == ClaimStatus::Approved
        });

        match holder {
            Some(holder) => Err(ClaimError::TargetAlreadyClaimed {
                target_id: candidate.target_id.clone(),
                approved_claim_id: holder.id,
            }),
            None => Ok(()),
        }
    }
}
