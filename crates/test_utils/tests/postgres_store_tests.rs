//! PostgreSQL adapter tests
//!
//! Each test starts its own container; run with `cargo test -- --ignored`.

use std::sync::Arc;

use core_kernel::{AccountId, PortError};
use domain_account::AccountStore;
use domain_claims::adapters::{InMemoryOutbox, InMemoryPlaceDirectory, ReviewerAllowlist};
use domain_claims::{
    ClaimError, ClaimServiceConfig, ClaimServicePorts, ClaimStatus, ClaimStore, ClaimTransaction,
    OwnershipClaimService,
};
use infra_db::{PgAccountStore, PgClaimStore};
use test_utils::{
    assert_business_for, assert_single_approval_per_target, assert_single_pending_per_claimant,
    db_test, ClaimBuilder, PlaceFixtures,
    SubmitClaimRequestBuilder, TestDatabase,
};

struct PgHarness {
    service: OwnershipClaimService,
    claims: PgClaimStore,
    accounts: PgAccountStore,
    reviewer: AccountId,
}

async fn pg_harness(db: &TestDatabase) -> PgHarness {
    let claims = PgClaimStore::new(db.pool().clone());
    let accounts = PgAccountStore::new(db.pool().clone());
    let places = InMemoryPlaceDirectory::new();
    places
        .insert(PlaceFixtures::bakery_id(), PlaceFixtures::bakery_details())
        .await;
    let reviewer = AccountId::new();

    let service = OwnershipClaimService::new(
        ClaimServicePorts {
            claims: Arc::new(claims.clone()),
            accounts: Arc::new(accounts.clone()),
            lookup: Arc::new(places),
            notifier: Arc::new(InMemoryOutbox::new()),
            reviewers: Arc::new(ReviewerAllowlist::new([reviewer])),
        },
        ClaimServiceConfig {
            auto_convert_on_approve: false,
        },
    );

    PgHarness {
        service,
        claims,
        accounts,
        reviewer,
    }
}

db_test!(test_submitted_claim_reads_back, |db| {
    let h = pg_harness(&db).await;
    let request = SubmitClaimRequestBuilder::new().build();

    let claim = h.service.submit(request.clone()).await.unwrap();
    let stored = h.claims.get(claim.id).await.unwrap().unwrap();

    assert_eq!(stored.claimant_id, request.claimant_id);
    assert_eq!(stored.claimant_contact, request.contact);
    assert_eq!(stored.target_snapshot, request.target_snapshot);
    assert_eq!(stored.verification, request.verification.normalized());
    assert_eq!(stored.status, ClaimStatus::Pending);
    assert!(stored.reviewed_at.is_none());
});

db_test!(test_duplicate_pending_is_refused, |db| {
    let h = pg_harness(&db).await;
    let request = SubmitClaimRequestBuilder::new().build();

    h.service.submit(request.clone()).await.unwrap();
    let err = h.service.submit(request).await.unwrap_err();

    assert!(matches!(err, ClaimError::DuplicatePending { .. }));
});

db_test!(test_approve_and_convert_persists_business_account, |db| {
    let h = pg_harness(&db).await;
    let claim = h.service.submit(SubmitClaimRequestBuilder::new().build()).await.unwrap();

    h.service.approve(claim.id, h.reviewer, None).await.unwrap();
    let account = h.service.convert_from_lookup(claim.id, h.reviewer).await.unwrap();

    let stored = h.accounts.get_account(claim.claimant_id).await.unwrap().unwrap();
    assert_business_for(&stored, &claim);
    assert_eq!(stored.business_profile, account.business_profile);
    assert_eq!(
        stored.business_profile.as_ref().and_then(|p| p.website.as_deref()),
        Some("https://cornerbakery.example")
    );

    let converted = h.claims.get(claim.id).await.unwrap().unwrap();
    assert!(converted.is_converted());
});

db_test!(test_concurrent_approvals_grant_one_listing, |db| {
    let h = pg_harness(&db).await;
    let first = h.service.submit(SubmitClaimRequestBuilder::new().build()).await.unwrap();
    let second = h.service.submit(SubmitClaimRequestBuilder::new().build()).await.unwrap();

    let (a, b) = tokio::join!(
        h.service.approve(first.id, h.reviewer, None),
        h.service.approve(second.id, h.reviewer, None),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(ClaimError::TargetAlreadyClaimed { .. })));

    let all = h.claims.list(None).await.unwrap();
    assert_single_approval_per_target(&all);
});

db_test!(test_concurrent_submits_keep_one_pending, |db| {
    let h = pg_harness(&db).await;
    let claimant = AccountId::new();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let service = h.service.clone();
            let request = SubmitClaimRequestBuilder::new().claimant(claimant).build();
            tokio::spawn(async move { service.submit(request).await })
        })
        .collect();

    let mut accepted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(ClaimError::DuplicatePending { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(duplicates, 5);
    let mine = h.claims.list_by_claimant(claimant).await.unwrap();
    assert_eq!(mine.iter().filter(|c| c.is_pending()).count(), 1);
    assert_single_pending_per_claimant(&mine);
});

db_test!(test_unique_index_backs_up_the_listing_lock, |db| {
    let h = pg_harness(&db).await;
    let first = ClaimBuilder::new().approved().build();
    let second = ClaimBuilder::new().approved().build();

    let mut tx = h.claims.begin().await.unwrap();
    tx.insert(&first).await.unwrap();
    tx.commit().await.unwrap();

    // Skips lock_target on purpose; only the partial index stands in the way
    let mut tx = h.claims.begin().await.unwrap();
    let err = tx.insert(&second).await.unwrap_err();

    assert!(matches!(err, PortError::Conflict { .. }));
});

db_test!(test_revoke_with_hard_delete_removes_row, |db| {
    let h = pg_harness(&db).await;
    let claim = h.service.submit(SubmitClaimRequestBuilder::new().build()).await.unwrap();
    h.service.approve(claim.id, h.reviewer, None).await.unwrap();

    h.service.revoke(claim.id, h.reviewer, "fraud", true).await.unwrap();

    assert!(h.claims.get(claim.id).await.unwrap().is_none());
    db.clear_data().await.unwrap();
    assert!(h.claims.list(None).await.unwrap().is_empty());
});
