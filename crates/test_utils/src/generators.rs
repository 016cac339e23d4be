//! Property-Based Test Generators
//!
//! Proptest strategies for claim data.

use proptest::prelude::*;

use core_kernel::TargetId;
use domain_claims::{ClaimStatus, ClaimantContact, TargetSnapshot, Verification};

/// A small pool of listing ids so generated claims collide often
pub fn target_id_strategy() -> impl Strategy<Value = TargetId> {
    (0u8..4).prop_map(|n| TargetId::new(format!("place-{}", n)).expect("generated id is not blank"))
}

pub fn claim_status_strategy() -> impl Strategy<Value = ClaimStatus> {
    prop_oneof![
        Just(ClaimStatus::Pending),
        Just(ClaimStatus::Approved),
        Just(ClaimStatus::Rejected),
    ]
}

pub fn contact_strategy() -> impl Strategy<Value = ClaimantContact> {
    ("[A-Z][a-z]{2,10}", "[a-z]{3,8}").prop_map(|(name, user)| ClaimantContact {
        email: format!("{}@example.com", user),
        display_name: name,
    })
}

pub fn snapshot_strategy() -> impl Strategy<Value = TargetSnapshot> {
    ("[A-Z][a-z]{3,12}( [A-Z][a-z]{3,12})?", "[0-9]{1,4} [A-Z][a-z]{3,8} St", "bakery|cafe|florist|garage")
        .prop_map(|(name, address, category)| TargetSnapshot {
            name,
            address,
            category,
        })
}

/// Verification that always carries a business phone or email
pub fn verified_strategy() -> impl Strategy<Value = Verification> {
    (
        proptest::option::of("owner|manager"),
        proptest::option::of("555-0[0-9]{3}"),
        proptest::option::of("[a-z]{3,8}@biz\\.example"),
        any::<bool>(),
    )
        .prop_map(|(role, phone, email, prefer_phone)| {
            let (business_phone, business_email) = match (phone, email) {
                (None, None) if prefer_phone => (Some("555-0100".to_string()), None),
                (None, None) => (None, Some("owner@biz.example".to_string())),
                other => other,
            };
            Verification {
                role,
                business_phone,
                business_email,
                justification: None,
            }
        })
}

/// Verification whose business contact fields are absent or blank
pub fn unverified_strategy() -> impl Strategy<Value = Verification> {
    (
        proptest::option::of("owner|manager"),
        proptest::option::of("[ \t]{0,3}"),
        proptest::option::of("[ \t]{0,3}"),
    )
        .prop_map(|(role, business_phone, business_email)| Verification {
            role,
            business_phone,
            business_email,
            justification: Some("I run it".to_string()),
        })
}

/// Notes made only of whitespace, including the empty string
pub fn blank_notes_strategy() -> impl Strategy<Value = String> {
    "[ \t\n]{0,6}"
}
