//! Ownership claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, ClaimId, TargetId};
use crate::error::ClaimError;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Awaiting review
    Pending,
    /// Listing granted to the claimant
    Approved,
    /// Refused, or revoked after approval
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ClaimStatus::Pending),
            "approved" => Ok(ClaimStatus::Approved),
            "rejected" => Ok(ClaimStatus::Rejected),
            other => Err(ClaimError::Validation(format!("unknown claim status '{}'", other))),
        }
    }
}

/// Claimant name and email captured at submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimantContact {
    pub display_name: String,
    pub email: String,
}

/// Listing attributes captured at submission, for display only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSnapshot {
    pub name: String,
    pub address: String,
    pub category: String,
}

/// Claimant-provided proof of ownership
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Role of the claimant at the business (owner, manager, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
}

impl Verification {
    /// Trims every field and drops the ones left empty
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            role: clean(self.role),
            business_phone: clean(self.business_phone),
            business_email: clean(self.business_email),
            justification: clean(self.justification),
        }
    }

    /// True when a business phone or email can be used to verify the claim
    pub fn has_business_contact(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.business_phone) || present(&self.business_email)
    }
}

/// A user's assertion of ownership over an external business listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: ClaimId,
    pub claimant_id: AccountId,
    pub claimant_contact: ClaimantContact,
    pub target_id: TargetId,
    pub target_snapshot: TargetSnapshot,
    pub verification: Verification,
    pub status: ClaimStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    /// Set by the first successful conversion; marks the claim as provisioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_at: Option<DateTime<Utc>>,
}

impl Claim {
    /// Creates a new pending claim
    ///
    /// Fails with `VerificationRequired` unless a business phone or email was
    /// supplied.
    pub fn submit(
        claimant_id: AccountId,
        claimant_contact: ClaimantContact,
        target_id: TargetId,
        target_snapshot: TargetSnapshot,
        verification: Verification,
    ) -> Result<Self, ClaimError> {
        let verification = verification.normalized();
        if !verification.has_business_contact() {
            return Err(ClaimError::VerificationRequired);
        }

        Ok(Self {
            id: ClaimId::new_v7(),
            claimant_id,
            claimant_contact,
            target_id,
            target_snapshot,
            verification,
            status: ClaimStatus::Pending,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewer_id: None,
            review_notes: None,
            revoked_at: None,
            converted_at: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == ClaimStatus::Pending
    }

    pub fn is_approved(&self) -> bool {
        self.status == ClaimStatus::Approved
    }

    pub fn is_converted(&self) -> bool {
        self.converted_at.is_some()
    }

    /// Marks the claim approved and records provenance
    pub fn approve(&mut self, reviewer_id: AccountId, notes: Option<String>) -> Result<(), ClaimError> {
        self.ensure_status(ClaimStatus::Pending, "approve")?;
        self.status = ClaimStatus::Approved;
        self.record_review(reviewer_id, notes.unwrap_or_default());
        Ok(())
    }

    /// Marks the claim rejected; notes are mandatory
    pub fn reject(&mut self, reviewer_id: AccountId, notes: &str) -> Result<(), ClaimError> {
        let notes = required_notes(notes)?;
        self.ensure_status(ClaimStatus::Pending, "reject")?;
        self.status = ClaimStatus::Rejected;
        self.record_review(reviewer_id, notes);
        Ok(())
    }

    /// Withdraws an approval, leaving any granted account profile untouched
    pub fn revoke(&mut self, revoker_id: AccountId, reason: &str) -> Result<(), ClaimError> {
        let reason = required_notes(reason)?;
        self.ensure_status(ClaimStatus::Approved, "revoke")?;
        self.status = ClaimStatus::Rejected;
        self.record_review(revoker_id, format!("revoked: {}", reason));
        self.revoked_at = self.reviewed_at;
        Ok(())
    }

    /// Records a successful conversion; only the first one sets the marker
    pub fn mark_converted(&mut self) -> Result<(), ClaimError> {
        if !self.is_approved() {
            return Err(ClaimError::NotApproved {
                claim_id: self.id,
                status: self.status,
            });
        }
        if self.converted_at.is_none() {
            self.converted_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Fails with `InvalidState` unless the claim is in `expected`
    pub fn ensure_status(&self, expected: ClaimStatus, operation: &'static str) -> Result<(), ClaimError> {
        if self.status != expected {
            return Err(ClaimError::InvalidState {
                claim_id: self.id,
                status: self.status,
                operation,
            });
        }
        Ok(())
    }

    fn record_review(&mut self, reviewer_id: AccountId, notes: String) {
        self.reviewed_at = Some(Utc::now());
        self.reviewer_id = Some(reviewer_id);
        self.review_notes = Some(notes);
    }
}

fn required_notes(notes: &str) -> Result<String, ClaimError> {
    let notes = notes.trim();
    if notes.is_empty() {
        return Err(ClaimError::NotesRequired);
    }
    Ok(notes.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_claim() -> Claim {
        Claim::submit(
            AccountId::new(),
            ClaimantContact {
                display_name: "Dana".to_string(),
                email: "dana@example.com".to_string(),
            },
            TargetId::new("place-1").unwrap(),
            TargetSnapshot {
                name: "Corner Bakery".to_string(),
                address: "12 Main St".to_string(),
                category: "bakery".to_string(),
            },
            Verification {
                business_phone: Some("555-0100".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_submit_starts_pending_without_provenance() {
        let claim = pending_claim();

        assert_eq!(claim.status, ClaimStatus::Pending);
        assert!(claim.reviewed_at.is_none());
        assert!(claim.reviewer_id.is_none());
        assert!(claim.review_notes.is_none());
        assert!(claim.converted_at.is_none());
    }

    #[test]
    fn test_submit_requires_business_contact() {
        let result = Claim::submit(
            AccountId::new(),
            ClaimantContact {
                display_name: "Dana".to_string(),
                email: "dana@example.com".to_string(),
            },
            TargetId::new("place-1").unwrap(),
            TargetSnapshot {
                name: "Corner Bakery".to_string(),
                address: "12 Main St".to_string(),
                category: "bakery".to_string(),
            },
            Verification {
                role: Some("owner".to_string()),
                business_phone: Some("   ".to_string()),
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(ClaimError::VerificationRequired)));
    }

    #[test]
    fn test_approve_defaults_notes_to_empty() {
        let mut claim = pending_claim();
        let reviewer = AccountId::new();

        claim.approve(reviewer, None).unwrap();

        assert_eq!(claim.status, ClaimStatus::Approved);
        assert_eq!(claim.reviewer_id, Some(reviewer));
        assert_eq!(claim.review_notes.as_deref(), Some(""));
        assert!(claim.reviewed_at.is_some());
    }

    #[test]
    fn test_reject_with_blank_notes_leaves_claim_untouched() {
        let mut claim = pending_claim();
        let before = claim.clone();

        let result = claim.reject(AccountId::new(), "  ");

        assert!(matches!(result, Err(ClaimError::NotesRequired)));
        assert_eq!(claim, before);
    }

    #[test]
    fn test_approve_twice_is_invalid_state() {
        let mut claim = pending_claim();
        claim.approve(AccountId::new(), None).unwrap();

        let result = claim.approve(AccountId::new(), None);

        assert!(matches!(result, Err(ClaimError::InvalidState { operation: "approve", .. })));
    }

    #[test]
    fn test_revoke_prefixes_reason_and_keeps_conversion_marker() {
        let mut claim = pending_claim();
        claim.approve(AccountId::new(), None).unwrap();
        claim.mark_converted().unwrap();
        let converted_at = claim.converted_at;

        claim.revoke(AccountId::new(), "created in error").unwrap();

        assert_eq!(claim.status, ClaimStatus::Rejected);
        assert_eq!(claim.review_notes.as_deref(), Some("revoked: created in error"));
        assert!(claim.revoked_at.is_some());
        assert_eq!(claim.converted_at, converted_at);
    }

    #[test]
    fn test_mark_converted_requires_approval() {
        let mut claim = pending_claim();

        assert!(matches!(claim.mark_converted(), Err(ClaimError::NotApproved { .. })));
        assert!(claim.converted_at.is_none());
    }

    #[test]
    fn test_mark_converted_keeps_first_timestamp() {
        let mut claim = pending_claim();
        claim.approve(AccountId::new(), None).unwrap();
        claim.mark_converted().unwrap();
        let first = claim.converted_at;

        claim.mark_converted().unwrap();

        assert_eq!(claim.converted_at, first);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Approved".parse::<ClaimStatus>().unwrap(), ClaimStatus::Approved);
        assert!("closed".parse::<ClaimStatus>().is_err());
    }
}
