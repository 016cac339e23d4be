//! Authentication
//!
//! Bearer JWTs identify the caller; `sub` carries the account id. Whether the
//! caller may review claims is decided by the reviewer directory, not by the
//! token.

use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::AccountId;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Subject (account id)
    pub sub: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl AuthClaims {
    pub fn account_id(&self) -> Result<AccountId, AuthError> {
        AccountId::from_str(&self.sub).map_err(|_| AuthError::InvalidSubject(self.sub.clone()))
    }
}

/// The authenticated caller, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentAccount(pub AccountId);

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token subject is not an account id: {0}")]
    InvalidSubject(String),
}

/// Creates a signed token for `account_id`
pub fn create_token(account_id: AccountId, secret: &str, expiration_secs: u64) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = AuthClaims {
        sub: account_id.as_uuid().to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a token and returns its claims
pub fn validate_token(token: &str, secret: &str) -> Result<AuthClaims, AuthError> {
    let token_data = decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let account = AccountId::new();

        let token = create_token(account, "secret", 60).unwrap();
        let claims = validate_token(&token, "secret").unwrap();

        assert_eq!(claims.account_id().unwrap(), account);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(AccountId::new(), "secret", 60).unwrap();

        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let claims = AuthClaims {
            sub: "alice".to_string(),
            exp: 0,
            iat: 0,
        };

        assert!(matches!(claims.account_id(), Err(AuthError::InvalidSubject(_))));
    }
}
