//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out what matters.

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;

use core_kernel::{AccountId, TargetId};
use domain_account::{Account, BusinessProfile};
use domain_claims::{
    Claim, ClaimStatus, ClaimantContact, SubmitClaimRequest, TargetSnapshot, Verification,
};

use crate::fixtures::{ClaimantFixtures, PlaceFixtures};

/// Builder for [`SubmitClaimRequest`]
#[derive(Debug, Clone)]
pub struct SubmitClaimRequestBuilder {
    claimant_id: AccountId,
    contact: ClaimantContact,
    target_id: TargetId,
    snapshot: TargetSnapshot,
    verification: Verification,
}

impl Default for SubmitClaimRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitClaimRequestBuilder {
    /// A random claimant claiming the bakery fixture by phone
    pub fn new() -> Self {
        Self {
            claimant_id: AccountId::new(),
            contact: ClaimantContact {
                display_name: Name().fake(),
                email: SafeEmail().fake(),
            },
            target_id: PlaceFixtures::bakery_id(),
            snapshot: PlaceFixtures::bakery_snapshot(),
            verification: ClaimantFixtures::owner_by_phone(),
        }
    }

    pub fn claimant(mut self, claimant_id: AccountId) -> Self {
        self.claimant_id = claimant_id;
        self
    }

    pub fn contact(mut self, contact: ClaimantContact) -> Self {
        self.contact = contact;
        self
    }

    /// Targets another listing; the snapshot name follows the id
    pub fn target(mut self, target_id: &str) -> Self {
        self.target_id = TargetId::new(target_id).expect("builder target id must not be blank");
        self.snapshot.name = format!("Listing {}", target_id);
        self
    }

    pub fn snapshot(mut self, snapshot: TargetSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn verification(mut self, verification: Verification) -> Self {
        self.verification = verification;
        self
    }

    pub fn build(self) -> SubmitClaimRequest {
        SubmitClaimRequest {
            claimant_id: self.claimant_id,
            contact: self.contact,
            target_id: self.target_id,
            target_snapshot: self.snapshot,
            verification: self.verification,
        }
    }
}

/// Builder for [`Claim`] values already in a given status
///
/// Status changes go through the aggregate's own transitions, so a built
/// claim always carries consistent review provenance.
#[derive(Debug, Clone)]
pub struct ClaimBuilder {
    request: SubmitClaimRequestBuilder,
    status: ClaimStatus,
    reviewer_id: AccountId,
    notes: String,
    converted: bool,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    pub fn new() -> Self {
        Self {
            request: SubmitClaimRequestBuilder::new(),
            status: ClaimStatus::Pending,
            reviewer_id: AccountId::new(),
            notes: "reviewed".to_string(),
            converted: false,
        }
    }

    pub fn request(mut self, request: SubmitClaimRequestBuilder) -> Self {
        self.request = request;
        self
    }

    pub fn approved(mut self) -> Self {
        self.status = ClaimStatus::Approved;
        self
    }

    pub fn rejected(mut self, notes: impl Into<String>) -> Self {
        self.status = ClaimStatus::Rejected;
        self.notes = notes.into();
        self
    }

    /// Approved and already converted
    pub fn converted(mut self) -> Self {
        self.status = ClaimStatus::Approved;
        self.converted = true;
        self
    }

    pub fn reviewer(mut self, reviewer_id: AccountId) -> Self {
        self.reviewer_id = reviewer_id;
        self
    }

    pub fn build(self) -> Claim {
        let request = self.request.build();
        let mut claim = Claim::submit(
            request.claimant_id,
            request.contact,
            request.target_id,
            request.target_snapshot,
            request.verification,
        )
        .expect("builder verification must include a business contact");

        match self.status {
            ClaimStatus::Pending => {}
            ClaimStatus::Approved => {
                claim.approve(self.reviewer_id, None).expect("pending claim approves");
                if self.converted {
                    claim.mark_converted().expect("approved claim converts");
                }
            }
            ClaimStatus::Rejected => {
                claim
                    .reject(self.reviewer_id, &self.notes)
                    .expect("rejection notes must not be blank");
            }
        }
        claim
    }
}

/// An individual account with a fake name and email
pub fn individual_account(id: AccountId) -> Account {
    Account::new_individual(id, Name().fake::<String>(), Some(SafeEmail().fake()))
}

/// A business account already holding `target_id`
pub fn business_account(id: AccountId, target_id: TargetId) -> Account {
    let snapshot = PlaceFixtures::bakery_snapshot();
    Account::new_business(
        id,
        Name().fake::<String>(),
        Some(SafeEmail().fake()),
        BusinessProfile::new(snapshot.name, snapshot.category, snapshot.address, target_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_builder_statuses() {
        let reviewer = AccountId::new();

        let approved = ClaimBuilder::new().approved().reviewer(reviewer).build();
        assert!(approved.is_approved());
        assert_eq!(approved.reviewer_id, Some(reviewer));
        assert!(!approved.is_converted());

        let rejected = ClaimBuilder::new().rejected("no proof").build();
        assert_eq!(rejected.status, ClaimStatus::Rejected);
        assert_eq!(rejected.review_notes.as_deref(), Some("no proof"));

        assert!(ClaimBuilder::new().converted().build().is_converted());
    }

    #[test]
    fn test_request_builder_target() {
        let request = SubmitClaimRequestBuilder::new().target("place-9").build();

        assert_eq!(request.target_id.as_str(), "place-9");
        assert_eq!(request.target_snapshot.name, "Listing place-9");
    }
}
