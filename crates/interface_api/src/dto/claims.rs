//! Ownership claim DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{AccountId, TargetId};
use domain_account::Account;
use domain_claims::{
    ApprovalOutcome, Claim, ClaimantContact, ConversionOutcome, SubmitClaimRequest, TargetSnapshot,
    Verification,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimBody {
    #[validate(length(min = 1, max = 256))]
    pub target_id: String,
    #[validate(length(min = 1, max = 512))]
    pub target_name: String,
    #[validate(length(max = 1024))]
    #[serde(default)]
    pub target_address: String,
    #[validate(length(max = 256))]
    #[serde(default)]
    pub target_category: String,
    #[validate(length(min = 1, max = 256))]
    pub display_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 128))]
    pub role: Option<String>,
    #[validate(length(max = 32))]
    pub business_phone: Option<String>,
    #[validate(email)]
    pub business_email: Option<String>,
    #[validate(length(max = 4000))]
    pub justification: Option<String>,
}

impl SubmitClaimBody {
    /// Validates the body and builds a request on behalf of `claimant_id`
    pub fn into_request(self, claimant_id: AccountId) -> Result<SubmitClaimRequest, ApiError> {
        self.validate()?;

        let target_id = TargetId::new(self.target_id).map_err(|e| ApiError::Validation(e.to_string()))?;

        Ok(SubmitClaimRequest {
            claimant_id,
            contact: ClaimantContact {
                display_name: self.display_name,
                email: self.email,
            },
            target_id,
            target_snapshot: TargetSnapshot {
                name: self.target_name,
                address: self.target_address,
                category: self.target_category,
            },
            verification: Verification {
                role: self.role,
                business_phone: self.business_phone,
                business_email: self.business_email,
                justification: self.justification,
            },
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ApproveBody {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
    pub notes: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeBody {
    pub reason: String,
    /// Delete the claim row instead of keeping it as rejected
    #[serde(default)]
    pub hard_delete: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityQuery {
    pub target_id: String,
}

/// Whether an operation would currently be allowed
#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConversionDto {
    /// `converted`, `deferred` or `not_attempted`
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<ConversionOutcome> for ConversionDto {
    fn from(outcome: ConversionOutcome) -> Self {
        match outcome {
            ConversionOutcome::Converted(account) => Self {
                status: "converted",
                account: Some(account),
                reason: None,
            },
            ConversionOutcome::Deferred(failure) => Self {
                status: "deferred",
                account: None,
                reason: Some(failure.to_string()),
            },
            ConversionOutcome::NotAttempted => Self {
                status: "not_attempted",
                account: None,
                reason: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub claim: Claim,
    pub conversion: ConversionDto,
}

impl From<ApprovalOutcome> for ApprovalResponse {
    fn from(outcome: ApprovalOutcome) -> Self {
        Self {
            claim: outcome.claim,
            conversion: outcome.conversion.into(),
        }
    }
}
