//! Ports and Adapters Infrastructure
//!
//! Foundational types for the hexagonal layout used by the domain crates.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        OwnershipClaimService (facade)         │
//! └──────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │ Port traits: ClaimStore, AccountStore,        │
//! │ PlaceLookupPort, NotificationPort,            │
//! │ ReviewerDirectory                             │
//! └──────────────────────────────────────────────┘
//!            ▲                         ▲
//!   ┌────────┴────────┐      ┌─────────┴────────┐
//!   │ PostgreSQL /    │      │ HTTP place        │
//!   │ in-memory store │      │ provider, notifier│
//!   └─────────────────┘      └──────────────────┘
//! ```
//!
//! Every adapter reports failures through [`PortError`], so the domain can
//! tell transient faults (retry later) from permanent ones without knowing
//! which adapter produced them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by an adapter behind any port
#[derive(Debug, Error)]
pub enum PortError {
    #[error("{entity_type} {id} does not exist")]
    NotFound { entity_type: String, id: String },

    /// Input the adapter refused to store or forward
    #[error("Rejected input: {message}")]
    Validation { message: String },

    /// A uniqueness rule in the backing store fired
    #[error("Conflicting write: {message}")]
    Conflict { message: String },

    #[error("Could not reach backend: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("{operation} gave up after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Credentials for an upstream service were refused
    #[error("Upstream refused credentials: {message}")]
    Unauthorized { message: String },

    #[error("Throttled by upstream, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("{service} is unavailable")]
    ServiceUnavailable { service: String },

    /// A payload could not be mapped to or from its stored shape
    #[error("Could not map payload: {message}")]
    Transformation { message: String },

    #[error("Adapter fault: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Whether repeating the call later could succeed.
    ///
    /// The conversion engine defers instead of failing on these.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. }
            | Self::Timeout { .. }
            | Self::RateLimited { .. }
            | Self::ServiceUnavailable { .. } => true,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Bound shared by every port trait so adapters can live behind `Arc<dyn _>`
pub trait DomainPort: Send + Sync + 'static {}

/// Tripping thresholds for adapters that call out over the network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the breaker
    pub failure_threshold: u32,
    /// Seconds spent open before a trial call is let through
    pub reset_timeout_secs: u64,
    /// Trial successes required to close again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_secs: 30,
            success_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

/// One adapter's answer to a readiness probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

/// Context forwarded to outbound adapters
#[derive(Debug, Clone, Default)]
pub struct OperationMetadata {
    /// Sent upstream so provider logs can be joined with ours
    pub correlation_id: Option<String>,
}

impl OperationMetadata {
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
        }
    }
}
