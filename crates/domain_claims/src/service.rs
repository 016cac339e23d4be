//! Ownership claim service
//!
//! Facade wiring the Exclusivity Guard, Submission, Review Authority,
//! Conversion Engine and Notification Hook over one set of ports. The HTTP
//! layer talks only to [`OwnershipClaimService`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use core_kernel::{AccountId, ClaimId, HealthCheckResult, TargetId};
use domain_account::{Account, AccountStore};

use crate::claim::{Claim, ClaimStatus};
use crate::conversion::{ConversionEngine, FreshAttributes};
use crate::error::{ClaimError, ConversionFailure};
use crate::guard::ExclusivityGuard;
use crate::notification::NotificationHook;
use crate::ports::{ClaimStore, NotificationPort, PlaceLookupPort, ReviewerDirectory};
use crate::review::ReviewAuthority;
use crate::submission::{ClaimSubmissions, SubmitClaimRequest};

/// Behavior switches for the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimServiceConfig {
    /// Run a lookup-backed conversion right after an approval commits
    #[serde(default = "default_auto_convert")]
    pub auto_convert_on_approve: bool,
}

fn default_auto_convert() -> bool {
    true
}

impl Default for ClaimServiceConfig {
    fn default() -> Self {
        Self {
            auto_convert_on_approve: default_auto_convert(),
        }
    }
}

/// The collaborators the service is built from
#[derive(Clone)]
pub struct ClaimServicePorts {
    pub claims: Arc<dyn ClaimStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub lookup: Arc<dyn PlaceLookupPort>,
    pub notifier: Arc<dyn NotificationPort>,
    pub reviewers: Arc<dyn ReviewerDirectory>,
}

/// What happened to conversion after an approval
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted(Account),
    /// The approval stands; conversion can be retried
    Deferred(ConversionFailure),
    NotAttempted,
}

/// Result of approving a claim
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalOutcome {
    pub claim: Claim,
    pub conversion: ConversionOutcome,
}

#[derive(Clone)]
pub struct OwnershipClaimService {
    claims: Arc<dyn ClaimStore>,
    accounts: Arc<dyn AccountStore>,
    lookup: Arc<dyn PlaceLookupPort>,
    submissions: ClaimSubmissions,
    guard: ExclusivityGuard,
    review: ReviewAuthority,
    conversion: ConversionEngine,
    notifications: NotificationHook,
    config: ClaimServiceConfig,
}

impl OwnershipClaimService {
    pub fn new(ports: ClaimServicePorts, config: ClaimServiceConfig) -> Self {
        Self {
            submissions: ClaimSubmissions::new(ports.claims.clone()),
            guard: ExclusivityGuard::new(ports.claims.clone()),
            review: ReviewAuthority::new(ports.claims.clone(), ports.reviewers),
            conversion: ConversionEngine::new(
                ports.claims.clone(),
                ports.accounts.clone(),
                ports.lookup.clone(),
            ),
            notifications: NotificationHook::new(ports.notifier),
            claims: ports.claims,
            accounts: ports.accounts,
            lookup: ports.lookup,
            config,
        }
    }

    pub fn config(&self) -> &ClaimServiceConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Claimant operations
    // ------------------------------------------------------------------

    pub async fn submit(&self, request: SubmitClaimRequest) -> Result<Claim, ClaimError> {
        self.submissions.submit(request).await
    }

    pub async fn withdraw(&self, claim_id: ClaimId, caller: AccountId) -> Result<(), ClaimError> {
        self.submissions.withdraw(claim_id, caller).await
    }

    /// Reads one claim; visible to its claimant and to reviewers
    pub async fn get(&self, claim_id: ClaimId, caller: AccountId) -> Result<Claim, ClaimError> {
        let claim = self
            .claims
            .get(claim_id)
            .await?
            .ok_or(ClaimError::NotFound(claim_id))?;

        if claim.claimant_id != caller && !self.review.is_reviewer(caller).await? {
            return Err(ClaimError::unauthorized(format!(
                "{} may not read claim {}",
                caller, claim_id
            )));
        }
        Ok(claim)
    }

    /// The caller's own claims, newest first
    pub async fn list_by_claimant(&self, claimant_id: AccountId) -> Result<Vec<Claim>, ClaimError> {
        Ok(self.claims.list_by_claimant(claimant_id).await?)
    }

    /// Every claim, optionally filtered by status; reviewers only
    pub async fn list_all(
        &self,
        caller: AccountId,
        status: Option<ClaimStatus>,
    ) -> Result<Vec<Claim>, ClaimError> {
        self.review.ensure_reviewer(caller).await?;
        Ok(self.claims.list(status).await?)
    }

    pub async fn can_submit(&self, claimant_id: AccountId, target_id: &TargetId) -> Result<(), ClaimError> {
        self.guard.can_submit(claimant_id, target_id).await
    }

    pub async fn can_approve(&self, claim_id: ClaimId) -> Result<(), ClaimError> {
        self.guard.can_approve(claim_id).await
    }

    pub async fn is_reviewer(&self, caller: AccountId) -> Result<bool, ClaimError> {
        self.review.is_reviewer(caller).await
    }

    // ------------------------------------------------------------------
    // Reviewer operations
    // ------------------------------------------------------------------

    /// Approves a claim, notifies the claimant and optionally converts
    ///
    /// Only the approval itself can fail this call. A conversion that does
    /// not go through is reported in the outcome and leaves the claim
    /// approved and unconverted.
    pub async fn approve(
        &self,
        claim_id: ClaimId,
        reviewer_id: AccountId,
        notes: Option<String>,
    ) -> Result<ApprovalOutcome, ClaimError> {
        let claim = self.review.approve(claim_id, reviewer_id, notes).await?;
        self.notifications.review_decided(&claim).await;

        if !self.config.auto_convert_on_approve {
            return Ok(ApprovalOutcome {
                claim,
                conversion: ConversionOutcome::NotAttempted,
            });
        }

        let conversion = match self.conversion.convert_from_lookup(claim_id).await {
            Ok(account) => ConversionOutcome::Converted(account),
            Err(ClaimError::ConversionFailed(failure)) => {
                warn!(claim_id = %claim_id, reason = %failure, "Conversion deferred after approval");
                ConversionOutcome::Deferred(failure)
            }
            Err(error) => {
                warn!(claim_id = %claim_id, error = %error, "Conversion skipped after approval");
                ConversionOutcome::NotAttempted
            }
        };

        let claim = match &conversion {
            ConversionOutcome::Converted(_) => self.refreshed(claim).await,
            _ => claim,
        };

        Ok(ApprovalOutcome { claim, conversion })
    }

    pub async fn reject(
        &self,
        claim_id: ClaimId,
        reviewer_id: AccountId,
        notes: &str,
    ) -> Result<Claim, ClaimError> {
        let claim = self.review.reject(claim_id, reviewer_id, notes).await?;
        self.notifications.review_decided(&claim).await;
        Ok(claim)
    }

    pub async fn revoke(
        &self,
        claim_id: ClaimId,
        revoker_id: AccountId,
        reason: &str,
        hard_delete: bool,
    ) -> Result<(), ClaimError> {
        self.review.revoke(claim_id, revoker_id, reason, hard_delete).await
    }

    pub async fn purge_rejected(&self, claim_id: ClaimId, admin_id: AccountId) -> Result<(), ClaimError> {
        self.review.purge_rejected(claim_id, admin_id).await
    }

    /// Converts with caller-supplied attributes; reviewers only
    pub async fn convert(
        &self,
        claim_id: ClaimId,
        caller: AccountId,
        fresh: FreshAttributes,
    ) -> Result<Account, ClaimError> {
        self.review.ensure_reviewer(caller).await?;
        self.conversion.convert(claim_id, fresh).await
    }

    /// Converts with attributes fetched from the place provider; reviewers only
    pub async fn convert_from_lookup(&self, claim_id: ClaimId, caller: AccountId) -> Result<Account, ClaimError> {
        self.review.ensure_reviewer(caller).await?;
        info!(claim_id = %claim_id, caller = %caller, "Conversion requested");
        self.conversion.convert_from_lookup(claim_id).await
    }

    /// Health of every backing adapter
    pub async fn health(&self) -> Vec<HealthCheckResult> {
        vec![
            self.claims.health_check().await,
            self.accounts.health_check().await,
            self.lookup.health_check().await,
        ]
    }

    async fn refreshed(&self, claim: Claim) -> Claim {
        match self.claims.get(claim.id).await {
            Ok(Some(current)) => current,
            _ => claim,
        }
    }
}
