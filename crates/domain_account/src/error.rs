//! Account domain errors

use thiserror::Error;

/// Errors that can occur in the account domain
#[derive(Debug, Error, PartialEq)]
pub enum AccountError {
    #[error("Account {account_id} is {account_type} but business profile present = {has_profile}")]
    InconsistentProfile {
        account_id: String,
        account_type: String,
        has_profile: bool,
    },

    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}
