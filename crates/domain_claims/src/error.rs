//! Ownership claim errors

use thiserror::Error;

use core_kernel::{AccountId, ClaimId, CoreError, PortError, TargetId};
use crate::claim::ClaimStatus;

/// Why a conversion did not complete
///
/// Both causes leave the claim approved with `convertedAt` unset, so another
/// call to convert is a full recovery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionFailure {
    /// The place provider could not be reached; retry later
    #[error("Place lookup unavailable: {0}")]
    LookupUnavailable(String),

    /// Writing the account or the claim failed; retrying immediately is reasonable
    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),
}

/// Errors that can occur in the ownership claim domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("A business phone or business email is required to verify the claim")]
    VerificationRequired,

    #[error("Claimant {claimant_id} already has a pending claim on {target_id}")]
    DuplicatePending {
        claimant_id: AccountId,
        target_id: TargetId,
        existing_claim_id: ClaimId,
    },

    #[error("Listing {target_id} is already claimed by approved claim {approved_claim_id}")]
    TargetAlreadyClaimed {
        target_id: TargetId,
        approved_claim_id: ClaimId,
    },

    #[error("Cannot {operation} claim {claim_id} in status {status}")]
    InvalidState {
        claim_id: ClaimId,
        status: ClaimStatus,
        operation: &'static str,
    },

    #[error("Review notes are required")]
    NotesRequired,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Claim {claim_id} is {status}, only approved claims can be converted")]
    NotApproved {
        claim_id: ClaimId,
        status: ClaimStatus,
    },

    #[error("Conversion failed: {0}")]
    ConversionFailed(#[from] ConversionFailure),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Claim not found: {0}")]
    NotFound(ClaimId),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ClaimError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ClaimError::Unauthorized(message.into())
    }

    /// Transient faults that may succeed when the same call is repeated
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClaimError::ConversionFailed(_) | ClaimError::PersistenceFailed(_)
        )
    }

    /// Business-rule rejections; these must never be retried automatically
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            ClaimError::DuplicatePending { .. }
                | ClaimError::TargetAlreadyClaimed { .. }
                | ClaimError::InvalidState { .. }
                | ClaimError::NotApproved { .. }
        )
    }
}

impl From<PortError> for ClaimError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Unauthorized { message } => ClaimError::Unauthorized(message),
            PortError::Validation { message, .. } => ClaimError::Validation(message),
            other => ClaimError::PersistenceFailed(other.to_string()),
        }
    }
}

impl From<CoreError> for ClaimError {
    fn from(error: CoreError) -> Self {
        ClaimError::Validation(error.to_string())
    }
}
