//! Ownership claim handlers

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use core_kernel::{ClaimId, TargetId};
use domain_account::Account;
use domain_claims::{Claim, ClaimStatus, FreshAttributes};

use crate::auth::CurrentAccount;
use crate::extract::OptionalJson;
use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

fn parse_claim_id(raw: &str) -> Result<ClaimId, ApiError> {
    ClaimId::from_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid claim id '{}'", raw)))
}

fn eligibility(result: Result<(), domain_claims::ClaimError>) -> Result<Json<EligibilityResponse>, ApiError> {
    match result {
        Ok(()) => Ok(Json(EligibilityResponse {
            allowed: true,
            reason: None,
        })),
        Err(e) if e.is_business_rule() => Ok(Json(EligibilityResponse {
            allowed: false,
            reason: Some(e.to_string()),
        })),
        Err(e) => Err(e.into()),
    }
}

/// Submits a claim for the caller
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Json(body): Json<SubmitClaimBody>,
) -> Result<(StatusCode, Json<Claim>), ApiError> {
    let claim = state.claims.submit(body.into_request(caller)?).await?;
    Ok((StatusCode::CREATED, Json(claim)))
}

/// Lists the caller's claims, newest first
pub async fn list_my_claims(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
) -> Result<Json<Vec<Claim>>, ApiError> {
    Ok(Json(state.claims.list_by_claimant(caller).await?))
}

pub async fn get_claim(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<Claim>, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    Ok(Json(state.claims.get(claim_id, caller).await?))
}

/// Withdraws one of the caller's pending claims
pub async fn withdraw_claim(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    state.claims.withdraw(claim_id, caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reports whether the caller could submit a claim on a listing right now
pub async fn submit_eligibility(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Query(query): Query<EligibilityQuery>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let target_id = TargetId::new(query.target_id).map_err(|e| ApiError::Validation(e.to_string()))?;
    eligibility(state.claims.can_submit(caller, &target_id).await)
}

// ----------------------------------------------------------------------
// Reviewer endpoints
// ----------------------------------------------------------------------

/// Lists every claim, optionally filtered by `?status=`
pub async fn list_all_claims(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Claim>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(ClaimStatus::from_str)
        .transpose()?;
    Ok(Json(state.claims.list_all(caller, status).await?))
}

pub async fn approve_eligibility(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    if !state.claims.is_reviewer(caller).await? {
        return Err(ApiError::Forbidden("reviewer capability required".to_string()));
    }
    eligibility(state.claims.can_approve(claim_id).await)
}

pub async fn approve_claim(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Path(id): Path<String>,
    OptionalJson(body): OptionalJson<ApproveBody>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    let notes = body.and_then(|body| body.notes);
    let outcome = state.claims.approve(claim_id, caller, notes).await?;
    Ok(Json(outcome.into()))
}

pub async fn reject_claim(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(body): Json<RejectBody>,
) -> Result<Json<Claim>, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    Ok(Json(state.claims.reject(claim_id, caller, &body.notes).await?))
}

pub async fn revoke_claim(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(body): Json<RevokeBody>,
) -> Result<StatusCode, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    state
        .claims
        .revoke(claim_id, caller, &body.reason, body.hard_delete)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Converts an approved claim
///
/// With a body the given attributes are used as-is; with an empty body they
/// are fetched from the place provider.
pub async fn convert_claim(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Path(id): Path<String>,
    OptionalJson(body): OptionalJson<FreshAttributes>,
) -> Result<Json<Account>, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    let account = match body {
        Some(fresh) => state.claims.convert(claim_id, caller, fresh).await?,
        None => state.claims.convert_from_lookup(claim_id, caller).await?,
    };
    Ok(Json(account))
}

/// Deletes a rejected claim
pub async fn purge_claim(
    State(state): State<AppState>,
    Extension(CurrentAccount(caller)): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let claim_id = parse_claim_id(&id)?;
    state.claims.purge_rejected(claim_id, caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
