//! API configuration

use std::str::FromStr;

use serde::Deserialize;

use core_kernel::AccountId;
use domain_claims::adapters::HttpPlaceLookupConfig;
use domain_claims::ClaimServiceConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Comma-separated account ids holding the reviewer capability
    pub reviewer_ids: String,
    pub place_lookup_base_url: String,
    pub place_lookup_api_key: String,
    pub place_lookup_timeout_secs: u64,
    /// Convert right after approval instead of waiting for an explicit call
    pub auto_convert_on_approve: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/ownership_claims".to_string(),
            log_level: "info".to_string(),
            reviewer_ids: String::new(),
            place_lookup_base_url: "http://localhost:9090/v1".to_string(),
            place_lookup_api_key: String::new(),
            place_lookup_timeout_secs: 10,
            auto_convert_on_approve: true,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses `reviewer_ids`; blank entries are skipped
    pub fn reviewer_account_ids(&self) -> Result<Vec<AccountId>, config::ConfigError> {
        self.reviewer_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                AccountId::from_str(id).map_err(|e| {
                    config::ConfigError::Message(format!("invalid reviewer id '{}': {}", id, e))
                })
            })
            .collect()
    }

    pub fn claim_service_config(&self) -> ClaimServiceConfig {
        ClaimServiceConfig {
            auto_convert_on_approve: self.auto_convert_on_approve,
        }
    }

    pub fn place_lookup_config(&self) -> HttpPlaceLookupConfig {
        HttpPlaceLookupConfig {
            base_url: self.place_lookup_base_url.clone(),
            api_key: self.place_lookup_api_key.clone(),
            timeout_secs: self.place_lookup_timeout_secs,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reviewer_ids_parse() {
        let a = AccountId::new();
        let b = AccountId::new();
        let config = ApiConfig {
            reviewer_ids: format!(" {}, ,{} ", a.as_uuid(), b),
            ..Default::default()
        };

        assert_eq!(config.reviewer_account_ids().unwrap(), vec![a, b]);
    }

    #[test]
    fn test_invalid_reviewer_id_rejected() {
        let config = ApiConfig {
            reviewer_ids: "not-a-uuid".to_string(),
            ..Default::default()
        };

        assert!(config.reviewer_account_ids().is_err());
    }

    #[test]
    fn test_no_reviewers_by_default() {
        assert!(ApiConfig::default().reviewer_account_ids().unwrap().is_empty());
        assert!(ApiConfig::default().claim_service_config().auto_convert_on_approve);
    }
}
