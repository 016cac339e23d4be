//! HTTP tests for the claims API over in-memory adapters

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use core_kernel::{AccountId, TargetId};
use domain_account::{AccountStore, InMemoryAccountStore};
use domain_claims::adapters::{
    InMemoryClaimStore, InMemoryOutbox, InMemoryPlaceDirectory, ReviewerAllowlist,
};
use domain_claims::{ClaimServiceConfig, ClaimServicePorts, OwnershipClaimService, PlaceDetails};
use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState};

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    accounts: InMemoryAccountStore,
    places: InMemoryPlaceDirectory,
    reviewer: AccountId,
}

fn test_app() -> TestApp {
    let accounts = InMemoryAccountStore::new();
    let places = InMemoryPlaceDirectory::new();
    let reviewer = AccountId::new();

    let service = OwnershipClaimService::new(
        ClaimServicePorts {
            claims: Arc::new(InMemoryClaimStore::new()),
            accounts: Arc::new(accounts.clone()),
            lookup: Arc::new(places.clone()),
            notifier: Arc::new(InMemoryOutbox::new()),
            reviewers: Arc::new(ReviewerAllowlist::new([reviewer])),
        },
        ClaimServiceConfig::default(),
    );

    // Nothing listens on port 1, so readiness sees the database as down
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy("postgres://postgres@127.0.0.1:1/ownership_claims")
        .unwrap();

    let config = ApiConfig {
        jwt_secret: SECRET.to_string(),
        ..Default::default()
    };

    TestApp {
        router: create_router(AppState::new(pool, config, service)),
        accounts,
        places,
        reviewer,
    }
}

fn bearer(account: AccountId) -> String {
    format!("Bearer {}", create_token(account, SECRET, 300).unwrap())
}

async fn send(app: &TestApp, method: &str, uri: &str, caller: Option<AccountId>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header("Authorization", bearer(caller));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn claim_body(target: &str) -> Value {
    json!({
        "targetId": target,
        "targetName": "Corner Bakery",
        "targetAddress": "12 Main St",
        "targetCategory": "bakery",
        "displayName": "Dana",
        "email": "dana@example.com",
        "role": "owner",
        "businessPhone": "555-0100"
    })
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/health/ready", None, None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/v1/ownership-claims/mine", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_submit_and_list_own_claims() {
    let app = test_app();
    let dana = AccountId::new();

    let (status, claim) = send(&app, "POST", "/api/v1/ownership-claims", Some(dana), Some(claim_body("place-1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(claim["status"], "pending");
    assert_eq!(claim["targetId"], "place-1");

    let (status, list) = send(&app, "GET", "/api/v1/ownership-claims/mine", Some(dana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, other) = send(&app, "GET", "/api/v1/ownership-claims/mine", Some(AccountId::new()), None).await;
    assert!(other.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_pending_is_conflict() {
    let app = test_app();
    let dana = AccountId::new();

    send(&app, "POST", "/api/v1/ownership-claims", Some(dana), Some(claim_body("place-1"))).await;
    let (status, body) = send(&app, "POST", "/api/v1/ownership-claims", Some(dana), Some(claim_body("place-1"))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_submit_without_business_contact_is_unprocessable() {
    let app = test_app();
    let mut body = claim_body("place-1");
    body.as_object_mut().unwrap().remove("businessPhone");

    let (status, _) = send(&app, "POST", "/api/v1/ownership-claims", Some(AccountId::new()), Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_review_endpoints_require_reviewer() {
    let app = test_app();

    let (status, _) = send(&app, "GET", "/api/v1/ownership-claims", Some(AccountId::new()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/v1/ownership-claims", Some(app.reviewer), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_approve_converts_claimant_account() {
    let app = test_app();
    let dana = AccountId::new();
    app.places
        .insert(
            TargetId::new("place-1").unwrap(),
            PlaceDetails {
                name: "Corner Bakery Ltd".to_string(),
                address: "12 Main St".to_string(),
                category: "bakery".to_string(),
                phone: None,
                website: Some("https://bakery.example".to_string()),
                coordinates: None,
                photo_ref: None,
            },
        )
        .await;

    let (_, claim) = send(&app, "POST", "/api/v1/ownership-claims", Some(dana), Some(claim_body("place-1"))).await;
    let uri = format!("/api/v1/ownership-claims/{}/approve", claim["id"].as_str().unwrap());

    let (status, body) = send(&app, "POST", &uri, Some(app.reviewer), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claim"]["status"], "approved");
    assert_eq!(body["conversion"]["status"], "converted");
    assert_eq!(body["conversion"]["account"]["accountType"], "business");
    assert_eq!(
        body["conversion"]["account"]["businessProfile"]["website"],
        "https://bakery.example"
    );

    let account = app.accounts.get_account(dana).await.unwrap().unwrap();
    assert!(account.is_business());

    let (_, eligibility) = send(
        &app,
        "GET",
        "/api/v1/ownership-claims/eligibility?targetId=place-1",
        Some(AccountId::new()),
        None,
    )
    .await;
    assert_eq!(eligibility["allowed"], false);
}

#[tokio::test]
async fn test_approval_stands_when_lookup_is_down() {
    let app = test_app();
    app.places.set_available(false);
    let (_, claim) = send(&app, "POST", "/api/v1/ownership-claims", Some(AccountId::new()), Some(claim_body("place-1"))).await;
    let id = claim["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "POST", &format!("/api/v1/ownership-claims/{}/approve", id), Some(app.reviewer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversion"]["status"], "deferred");

    let (status, _) = send(&app, "POST", &format!("/api/v1/ownership-claims/{}/convert", id), Some(app.reviewer), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    app.places.set_available(true);
    let (status, account) = send(&app, "POST", &format!("/api/v1/ownership-claims/{}/convert", id), Some(app.reviewer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["accountType"], "business");
}

#[tokio::test]
async fn test_malformed_convert_body_is_not_a_lookup() {
    let app = test_app();
    app.places.set_available(false);
    let (_, claim) = send(&app, "POST", "/api/v1/ownership-claims", Some(AccountId::new()), Some(claim_body("place-1"))).await;
    let id = claim["id"].as_str().unwrap().to_string();
    send(&app, "POST", &format!("/api/v1/ownership-claims/{}/approve", id), Some(app.reviewer), None).await;
    let lookups_after_approval = app.places.lookup_count();
    let uri = format!("/api/v1/ownership-claims/{}/convert", id);

    let (status, body) = send(&app, "POST", &uri, Some(app.reviewer), Some(json!({ "phone": "+1 555", "website": 42 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(app.places.lookup_count(), lookups_after_approval);

    let (status, account) = send(&app, "POST", &uri, Some(app.reviewer), Some(json!({ "phone": "+1 555 0142" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["businessProfile"]["phone"], "+1 555 0142");
    assert_eq!(app.places.lookup_count(), lookups_after_approval);
}

#[tokio::test]
async fn test_malformed_approve_body_leaves_claim_pending() {
    let app = test_app();
    let (_, claim) = send(&app, "POST", "/api/v1/ownership-claims", Some(AccountId::new()), Some(claim_body("place-1"))).await;
    let id = claim["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "POST", &format!("/api/v1/ownership-claims/{}/approve", id), Some(app.reviewer), Some(json!({ "notes": ["not", "text"] }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, stored) = send(&app, "GET", &format!("/api/v1/ownership-claims/{}", id), Some(app.reviewer), None).await;
    assert_eq!(stored["status"], "pending");
}

#[tokio::test]
async fn test_reject_requires_notes() {
    let app = test_app();
    let (_, claim) = send(&app, "POST", "/api/v1/ownership-claims", Some(AccountId::new()), Some(claim_body("place-1"))).await;
    let uri = format!("/api/v1/ownership-claims/{}/reject", claim["id"].as_str().unwrap());

    let (status, _) = send(&app, "POST", &uri, Some(app.reviewer), Some(json!({ "notes": "   " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, "POST", &uri, Some(app.reviewer), Some(json!({ "notes": "no proof" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["reviewNotes"], "no proof");
}

#[tokio::test]
async fn test_withdraw_then_get_is_not_found() {
    let app = test_app();
    let dana = AccountId::new();
    let (_, claim) = send(&app, "POST", "/api/v1/ownership-claims", Some(dana), Some(claim_body("place-1"))).await;
    let uri = format!("/api/v1/ownership-claims/{}", claim["id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &uri, Some(AccountId::new()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &uri, Some(dana), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, Some(dana), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_claim_id_is_bad_request() {
    let app = test_app();

    let (status, _) = send(&app, "GET", "/api/v1/ownership-claims/not-a-uuid", Some(AccountId::new()), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
