//! Custom Test Assertions
//!
//! Assertions over claim collections with messages that name the offending
//! claims.

use std::collections::HashMap;

use core_kernel::{AccountId, TargetId};
use domain_account::Account;
use domain_claims::{Claim, ClaimStatus};

/// Asserts that no listing has more than one approved claim
pub fn assert_single_approval_per_target(claims: &[Claim]) {
    let mut approved: HashMap<&TargetId, Vec<&Claim>> = HashMap::new();
    for claim in claims.iter().filter(|c| c.is_approved()) {
        approved.entry(&claim.target_id).or_default().push(claim);
    }

    for (target_id, holders) in approved {
        assert!(
            holders.len() <= 1,
            "Listing {} has {} approved claims: {:?}",
            target_id,
            holders.len(),
            holders.iter().map(|c| c.id).collect::<Vec<_>>()
        );
    }
}

/// Asserts that no claimant has two pending claims on the same listing
pub fn assert_single_pending_per_claimant(claims: &[Claim]) {
    let mut pending: HashMap<(AccountId, &TargetId), usize> = HashMap::new();
    for claim in claims.iter().filter(|c| c.is_pending()) {
        *pending.entry((claim.claimant_id, &claim.target_id)).or_default() += 1;
    }

    for ((claimant_id, target_id), count) in pending {
        assert!(
            count <= 1,
            "Claimant {} has {} pending claims on {}",
            claimant_id,
            count,
            target_id
        );
    }
}

/// Asserts review provenance matches the status
pub fn assert_review_provenance(claim: &Claim) {
    match claim.status {
        ClaimStatus::Pending => {
            assert!(claim.reviewed_at.is_none(), "Pending claim {} has reviewedAt", claim.id);
            assert!(claim.reviewer_id.is_none(), "Pending claim {} has reviewerId", claim.id);
            assert!(claim.converted_at.is_none(), "Pending claim {} is converted", claim.id);
        }
        ClaimStatus::Approved | ClaimStatus::Rejected => {
            assert!(claim.reviewed_at.is_some(), "Claim {} lacks reviewedAt", claim.id);
            assert!(claim.reviewer_id.is_some(), "Claim {} lacks reviewerId", claim.id);
        }
    }
}

/// Asserts the account is a business account bound to the claim's listing
pub fn assert_business_for(account: &Account, claim: &Claim) {
    assert_eq!(account.id, claim.claimant_id, "Account is not the claimant's");
    assert!(account.is_business(), "Account {} is not a business account", account.id);

    let profile = account
        .business_profile
        .as_ref()
        .unwrap_or_else(|| panic!("Business account {} has no profile", account.id));
    assert_eq!(profile.claimed_target_id, claim.target_id, "Profile bound to the wrong listing");
    assert_eq!(profile.name, claim.target_snapshot.name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{ClaimBuilder, SubmitClaimRequestBuilder};

    #[test]
    fn test_distinct_targets_pass() {
        let a = ClaimBuilder::new()
            .request(SubmitClaimRequestBuilder::new().target("place-1"))
            .approved()
            .build();
        let b = ClaimBuilder::new()
            .request(SubmitClaimRequestBuilder::new().target("place-2"))
            .approved()
            .build();

        assert_single_approval_per_target(&[a.clone(), b.clone()]);
        assert_review_provenance(&a);
    }

    #[test]
    #[should_panic(expected = "approved claims")]
    fn test_double_approval_detected() {
        let a = ClaimBuilder::new().approved().build();
        let b = ClaimBuilder::new().approved().build();

        assert_single_approval_per_target(&[a, b]);
    }

    #[test]
    #[should_panic(expected = "pending claims")]
    fn test_double_pending_detected() {
        let request = SubmitClaimRequestBuilder::new();
        let a = ClaimBuilder::new().request(request.clone()).build();
        let b = ClaimBuilder::new().request(request).build();

        assert_single_pending_per_claimant(&[a, b]);
    }
}
