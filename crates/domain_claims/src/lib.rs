//! Ownership Claims Domain
//!
//! This crate implements the lifecycle of a user's claim to own a business
//! listing, from submission through review to the grant of a business
//! account.
//!
//! # Claim Lifecycle
//!
//! ```text
//!                 +-- withdraw --> (deleted)
//!                 |
//! submit --> Pending --approve--> Approved --convert--> Approved + convertedAt
//!                 |                   |
//!                 +--reject--> Rejected <--revoke--+
//! ```
//!
//! A listing has at most one approved claim and a claimant at most one
//! pending claim per listing. Both rules are enforced inside a claim
//! transaction that locks the listing (see [`ports::ClaimTransaction`]).
//!
//! # Example
//!
//! ```rust,ignore
//! let service = OwnershipClaimService::new(ports, ClaimServiceConfig::default());
//! let claim = service.submit(request).await?;
//! let outcome = service.approve(claim.id, reviewer_id, None).await?;
//! ```

pub mod adapters;
pub mod claim;
pub mod conversion;
pub mod error;
pub mod guard;
pub mod notification;
pub mod ports;
pub mod review;
pub mod service;
pub mod submission;

pub use claim::{Claim, ClaimStatus, ClaimantContact, TargetSnapshot, Verification};
pub use conversion::{build_profile, ConversionEngine, FreshAttributes};
pub use error::{ClaimError, ConversionFailure};
pub use guard::ExclusivityGuard;
pub use notification::NotificationHook;
pub use ports::{
    ClaimStore, ClaimTransaction, GeoPoint, NotificationPort, PlaceDetails, PlaceLookupPort,
    ReviewDecision, ReviewNotice, ReviewerDirectory,
};
pub use review::ReviewAuthority;
pub use service::{
    ApprovalOutcome, ClaimServiceConfig, ClaimServicePorts, ConversionOutcome,
    OwnershipClaimService,
};
pub use submission::{ClaimSubmissions, SubmitClaimRequest};
