//! Conversion Engine
//!
//! Turns an approved claim into a business account grant. Conversion always
//! recomputes the whole [`BusinessProfile`] from the claim and the latest
//! place attributes and writes it over whatever the account held, so running
//! it again (or twice at once) converges on the same result. A claim that is
//! approved but not yet converted is a normal resting state: calling
//! [`ConversionEngine::convert`] again is the recovery.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use core_kernel::{ClaimId, OperationMetadata, PortError};
use domain_account::{Account, AccountStore, BusinessProfile, Coordinates};

use crate::claim::Claim;
use crate::error::{ClaimError, ConversionFailure};
use crate::guard::lock_claim;
use crate::ports::{ClaimStore, GeoPoint, PlaceDetails, PlaceLookupPort};

/// Attributes fetched from the place provider at conversion time
///
/// Any field left `None` falls back to what the claim itself carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshAttributes {
    pub phone: Option<String>,
    pub website: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub photo_ref: Option<String>,
}

impl From<PlaceDetails> for FreshAttributes {
    fn from(details: PlaceDetails) -> Self {
        Self {
            phone: details.phone,
            website: details.website,
            coordinates: details.coordinates,
            photo_ref: details.photo_ref,
        }
    }
}

/// Computes the business profile for an approved claim
///
/// Name, category and address come from the submission snapshot. The phone
/// prefers the provider's value over the self-reported one. Discount
/// participation always starts disabled.
pub fn build_profile(claim: &Claim, fresh: &FreshAttributes) -> BusinessProfile {
    let snapshot = &claim.target_snapshot;
    let mut profile = BusinessProfile::new(
        snapshot.name.clone(),
        snapshot.category.clone(),
        snapshot.address.clone(),
        claim.target_id.clone(),
    );

    profile.phone = non_blank(fresh.phone.clone()).or_else(|| claim.verification.business_phone.clone());
    profile.website = non_blank(fresh.website.clone());
    profile.logo_ref = non_blank(fresh.photo_ref.clone());
    profile.coordinates = fresh.coordinates.and_then(|point| {
        Coordinates::new(point.latitude, point.longitude)
            .map_err(|e| warn!(claim_id = %claim.id, error = %e, "Ignoring provider coordinates"))
            .ok()
    });
    profile
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn persistence(error: impl std::fmt::Display) -> ClaimError {
    ClaimError::ConversionFailed(ConversionFailure::PersistenceFailed(error.to_string()))
}

/// Lifts store failures into the conversion taxonomy, leaving rule errors alone
fn into_conversion_error(error: ClaimError) -> ClaimError {
    match error {
        ClaimError::PersistenceFailed(message) => persistence(message),
        other => other,
    }
}

/// Materializes approved claims into business accounts
#[derive(Clone)]
pub struct ConversionEngine {
    claims: Arc<dyn ClaimStore>,
    accounts: Arc<dyn AccountStore>,
    lookup: Arc<dyn PlaceLookupPort>,
}

impl ConversionEngine {
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        accounts: Arc<dyn AccountStore>,
        lookup: Arc<dyn PlaceLookupPort>,
    ) -> Self {
        Self { claims, accounts, lookup }
    }

    /// Converts an approved claim using caller-supplied attributes
    ///
    /// Creates the claimant's account if it does not exist yet, otherwise
    /// elevates it and replaces its profile. `convertedAt` is set on the
    /// first success only.
    pub async fn convert(&self, claim_id: ClaimId, fresh: FreshAttributes) -> Result<Account, ClaimError> {
        let claim = self.approved_claim(claim_id).await?;
        let profile = build_profile(&claim, &fresh);

        let account = match self.accounts.get_account(claim.claimant_id).await.map_err(persistence)? {
            Some(mut account) => {
                account.grant_business(profile);
                account
            }
            None => {
                debug!(claim_id = %claim_id, claimant_id = %claim.claimant_id, "Creating account during conversion");
                Account::new_business(
                    claim.claimant_id,
                    claim.claimant_contact.display_name.clone(),
                    Some(claim.claimant_contact.email.clone()),
                    profile,
                )
            }
        };
        self.accounts.save_account(&account).await.map_err(persistence)?;

        self.mark_converted(claim_id).await?;

        info!(
            claim_id = %claim_id,
            account_id = %account.id,
            target_id = %claim.target_id,
            "Ownership claim converted"
        );
        Ok(account)
    }

    /// Queries the place provider, then converts
    ///
    /// A provider that cannot be reached fails with `LookupUnavailable`
    /// before anything is written. A listing the provider no longer knows
    /// converts from the claim's own data.
    pub async fn convert_from_lookup(&self, claim_id: ClaimId) -> Result<Account, ClaimError> {
        let claim = self.approved_claim(claim_id).await?;
        let fresh = self.fetch_fresh_attributes(&claim).await?;
        self.convert(claim_id, fresh).await
    }

    /// Asks the place provider for the listing's current attributes
    pub async fn fetch_fresh_attributes(&self, claim: &Claim) -> Result<FreshAttributes, ConversionFailure> {
        let metadata = OperationMetadata::with_correlation_id(claim.id.to_string());

        match self.lookup.lookup_target(&claim.target_id, Some(metadata)).await {
            Ok(details) => Ok(details.into()),
            Err(PortError::NotFound { .. }) => {
                warn!(
                    claim_id = %claim.id,
                    target_id = %claim.target_id,
                    "Listing no longer resolves, converting from snapshot"
                );
                Ok(FreshAttributes::default())
            }
            Err(error) => {
                warn!(
                    claim_id = %claim.id,
                    target_id = %claim.target_id,
                    error = %error,
                    "Place lookup failed"
                );
                Err(ConversionFailure::LookupUnavailable(error.to_string()))
            }
        }
    }

    async fn approved_claim(&self, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        let claim = self
            .claims
            .get(claim_id)
            .await
            .map_err(persistence)?
            .ok_or(ClaimError::NotFound(claim_id))?;

        if !claim.is_approved() {
            return Err(ClaimError::NotApproved {
                claim_id,
                status: claim.status,
            });
        }
        Ok(claim)
    }

    /// Sets `convertedAt` if the claim is still approved under the listing lock
    async fn mark_converted(&self, claim_id: ClaimId) -> Result<(), ClaimError> {
        let mut tx = self.claims.begin().await.map_err(persistence)?;
        let (mut claim, _) = lock_claim(&mut tx, claim_id).await.map_err(into_conversion_error)?;

        let first_conversion = !claim.is_converted();
        claim.mark_converted()?;

        if first_conversion {
            tx.update(&claim).await.map_err(persistence)?;
            tx.commit().await.map_err(persistence)?;
        }
        Ok(())
    }
}
