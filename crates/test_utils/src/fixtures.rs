//! Pre-built Test Fixtures
//!
//! Fixed, predictable data for unit tests.

use core_kernel::TargetId;
use domain_claims::{ClaimantContact, PlaceDetails, TargetSnapshot, Verification};

/// Listing fixtures
pub struct PlaceFixtures;

impl PlaceFixtures {
    pub fn bakery_id() -> TargetId {
        TargetId::new("place-corner-bakery").expect("fixture target id is valid")
    }

    pub fn bakery_snapshot() -> TargetSnapshot {
        TargetSnapshot {
            name: "Corner Bakery".to_string(),
            address: "12 Main St".to_string(),
            category: "bakery".to_string(),
        }
    }

    /// Provider view of the bakery, with attributes the snapshot lacks
    pub fn bakery_details() -> PlaceDetails {
        PlaceDetails {
            name: "Corner Bakery".to_string(),
            address: "12 Main St".to_string(),
            category: "bakery".to_string(),
            phone: Some("555-0199".to_string()),
            website: Some("https://cornerbakery.example".to_string()),
            coordinates: None,
            photo_ref: Some("photos/corner-bakery".to_string()),
        }
    }
}

/// Claimant fixtures
pub struct ClaimantFixtures;

impl ClaimantFixtures {
    pub fn dana() -> ClaimantContact {
        ClaimantContact {
            display_name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
        }
    }

    pub fn owner_by_phone() -> Verification {
        Verification {
            role: Some("owner".to_string()),
            business_phone: Some("555-0100".to_string()),
            ..Default::default()
        }
    }

    pub fn manager_by_email() -> Verification {
        Verification {
            role: Some("manager".to_string()),
            business_email: Some("manager@cornerbakery.example".to_string()),
            ..Default::default()
        }
    }

    /// Verification without any business contact
    pub fn unverifiable() -> Verification {
        Verification {
            role: Some("owner".to_string()),
            justification: Some("trust me".to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_fixtures() {
        assert!(ClaimantFixtures::owner_by_phone().has_business_contact());
        assert!(ClaimantFixtures::manager_by_email().has_business_contact());
        assert!(!ClaimantFixtures::unverifiable().has_business_contact());
    }
}
