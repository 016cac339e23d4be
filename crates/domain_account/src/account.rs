//! Account aggregate and business profile

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, TargetId};
use crate::error::AccountError;

/// Account type flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Individual,
    Business,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Individual => "individual",
            AccountType::Business => "business",
        }
    }
}

/// Geographic position of a business
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Creates coordinates, rejecting values outside WGS84 bounds
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AccountError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(AccountError::InvalidCoordinates { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}

/// Business payload attached to a business account
///
/// The profile is always rebuilt as a whole from the claim and the place
/// provider; nothing patches individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub name: String,
    pub category: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_ref: Option<String>,
    /// Listing this profile was granted for
    pub claimed_target_id: TargetId,
    /// Whether the business currently takes part in the discount program
    pub discount_program_enabled: bool,
    pub default_discount_percent: Decimal,
}

impl BusinessProfile {
    /// Creates a profile with discount participation switched off
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        address: impl Into<String>,
        claimed_target_id: TargetId,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            address: address.into(),
            coordinates: None,
            phone: None,
            website: None,
            logo_ref: None,
            claimed_target_id,
            discount_program_enabled: false,
            default_discount_percent: Decimal::ZERO,
        }
    }
}

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub account_type: AccountType,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_profile: Option<BusinessProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates an individual account
    pub fn new_individual(id: AccountId, display_name: impl Into<String>, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            account_type: AccountType::Individual,
            display_name: display_name.into(),
            email,
            business_profile: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an account that starts life as a business
    pub fn new_business(
        id: AccountId,
        display_name: impl Into<String>,
        email: Option<String>,
        profile: BusinessProfile,
    ) -> Self {
        let mut account = Self::new_individual(id, display_name, email);
        account.account_type = AccountType::Business;
        account.business_profile = Some(profile);
        account
    }

    /// Rebuilds an account from stored parts, checking the profile/type pairing
    pub fn from_parts(
        id: AccountId,
        account_type: AccountType,
        display_name: String,
        email: Option<String>,
        business_profile: Option<BusinessProfile>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, AccountError> {
        let account = Self {
            id,
            account_type,
            display_name,
            email,
            business_profile,
            created_at,
            updated_at,
        };
        account.validate()?;
        Ok(account)
    }

    /// Elevates the account to `business` and replaces the profile wholesale
    pub fn grant_business(&mut self, profile: BusinessProfile) {
        self.account_type = AccountType::Business;
        self.business_profile = Some(profile);
        self.updated_at = Utc::now();
    }

    pub fn is_business(&self) -> bool {
        self.account_type == AccountType::Business
    }

    /// Checks that a profile is present exactly when the account is a business
    pub fn validate(&self) -> Result<(), AccountError> {
        let has_profile = self.business_profile.is_some();
        if has_profile != self.is_business() {
            return Err(AccountError::InconsistentProfile {
                account_id: self.id.to_string(),
                account_type: self.account_type.as_str().to_string(),
                has_profile,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BusinessProfile {
        BusinessProfile::new("Corner Bakery", "bakery", "12 Main St", TargetId::new("place-1").unwrap())
    }

    #[test]
    fn test_grant_business_replaces_profile() {
        let mut account = Account::new_individual(AccountId::new(), "Dana", None);
        account.grant_business(profile());

        let mut second = profile();
        second.name = "Corner Bakery & Cafe".to_string();
        account.grant_business(second.clone());

        assert!(account.is_business());
        assert_eq!(account.business_profile, Some(second));
    }

    #[test]
    fn test_from_parts_rejects_individual_with_profile() {
        let now = Utc::now();
        let result = Account::from_parts(
            AccountId::new(),
            AccountType::Individual,
            "Dana".to_string(),
            None,
            Some(profile()),
            now,
            now,
        );
        assert!(matches!(result, Err(AccountError::InconsistentProfile { has_profile: true, .. })));
    }

    #[test]
    fn test_coordinates_bounds() {
        assert!(Coordinates::new(44.97, -93.26).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, 181.0).is_err());
    }
}
