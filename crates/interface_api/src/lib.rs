//! HTTP API Layer
//!
//! REST surface of the ownership claim subsystem, built on Axum.
//!
//! # Architecture
//!
//! - **Handlers**: claimant and reviewer endpoints over [`OwnershipClaimService`]
//! - **Middleware**: bearer-token authentication and audit logging
//! - **DTOs**: request and response bodies, plus an optional-body extractor
//! - **Error Handling**: claim errors mapped to consistent JSON responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{build_service, create_router, AppState};
//!
//! let claims = build_service(pool.clone(), &config)?;
//! let app = create_router(AppState::new(pool, config, claims));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_claims::adapters::{HttpPlaceLookup, ReviewerAllowlist, TracingNotifier};
use domain_claims::{ClaimServicePorts, OwnershipClaimService};
use infra_db::{PgAccountStore, PgClaimStore};

use crate::config::ApiConfig;
use crate::handlers::{claims, health};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub claims: Arc<OwnershipClaimService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: ApiConfig, claims: OwnershipClaimService) -> Self {
        Self {
            pool,
            config,
            claims: Arc::new(claims),
        }
    }
}

/// Wires the claim service to PostgreSQL, the place provider and the
/// configured reviewer list
pub fn build_service(pool: PgPool, config: &ApiConfig) -> anyhow::Result<OwnershipClaimService> {
    let reviewers = config.reviewer_account_ids()?;
    if reviewers.is_empty() {
        tracing::warn!("No reviewer accounts configured; review endpoints will refuse every caller");
    }

    let ports = ClaimServicePorts {
        claims: Arc::new(PgClaimStore::new(pool.clone())),
        accounts: Arc::new(PgAccountStore::new(pool)),
        lookup: Arc::new(HttpPlaceLookup::new(config.place_lookup_config())?),
        notifier: Arc::new(TracingNotifier),
        reviewers: Arc::new(ReviewerAllowlist::new(reviewers)),
    };

    Ok(OwnershipClaimService::new(ports, config.claim_service_config()))
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Reviewer-only routes check the capability inside the service
    let claim_routes = Router::new()
        .route("/", post(claims::submit_claim).get(claims::list_all_claims))
        .route("/mine", get(claims::list_my_claims))
        .route("/eligibility", get(claims::submit_eligibility))
        .route("/:id", get(claims::get_claim).delete(claims::withdraw_claim))
        .route("/:id/eligibility", get(claims::approve_eligibility))
        .route("/:id/approve", post(claims::approve_claim))
        .route("/:id/reject", post(claims::reject_claim))
        .route("/:id/revoke", post(claims::revoke_claim))
        .route("/:id/convert", post(claims::convert_claim))
        .route("/:id/purge", delete(claims::purge_claim));

    // Audit runs inside auth so it sees the authenticated caller
    let api_routes = Router::new()
        .nest("/ownership-claims", claim_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
