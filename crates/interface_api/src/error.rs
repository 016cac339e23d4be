//! Mapping of domain failures onto HTTP responses
//!
//! Every failure leaves the API as `{"error": <kind>, "message": <text>}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_claims::{ClaimError, ConversionFailure};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    /// Malformed path or query input
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid bearer token
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated, but not permitted to act on this claim
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Stable machine-readable kind, sent as the `error` field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Validation(_) => "validation_error",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!(detail = %detail, "Request failed with internal error");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        let message = err.to_string();
        match err {
            ClaimError::NotFound(_) => ApiError::NotFound(message),
            ClaimError::Unauthorized(_) => ApiError::Forbidden(message),
            ClaimError::DuplicatePending { .. }
            | ClaimError::TargetAlreadyClaimed { .. }
            | ClaimError::InvalidState { .. }
            | ClaimError::NotApproved { .. } => ApiError::Conflict(message),
            ClaimError::VerificationRequired
            | ClaimError::NotesRequired
            | ClaimError::Validation(_) => ApiError::Validation(message),
            ClaimError::ConversionFailed(ConversionFailure::LookupUnavailable(_)) => {
                ApiError::ServiceUnavailable(message)
            }
            ClaimError::ConversionFailed(ConversionFailure::PersistenceFailed(_))
            | ClaimError::PersistenceFailed(_) => ApiError::Internal(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
            ApiError::Validation(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{ClaimId, TargetId};

    fn status_of(err: ClaimError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_kind_and_message() {
        let err = ApiError::Conflict("claim already pending".to_string());

        assert_eq!(err.kind(), "conflict");
        assert_eq!(err.to_string(), "claim already pending");
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_claim_error_status_codes() {
        assert_eq!(status_of(ClaimError::NotFound(ClaimId::new())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ClaimError::unauthorized("no")), StatusCode::FORBIDDEN);
        assert_eq!(status_of(ClaimError::NotesRequired), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of(ClaimError::VerificationRequired), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_of(ClaimError::TargetAlreadyClaimed {
                target_id: TargetId::new("place-1").unwrap(),
                approved_claim_id: ClaimId::new(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ConversionFailure::LookupUnavailable("down".to_string()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ClaimError::PersistenceFailed("disk".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
