//! REST client for the external place provider
//!
//! Non-success responses become `PortError`s: 404 is `NotFound`, 401 and 403
//! are `Unauthorized`, 429 is `RateLimited` (honouring `Retry-After`) and 5xx
//! is `ServiceUnavailable`. Transport timeouts surface as `Timeout`.
//!
//! After `failure_threshold` consecutive transient failures the breaker
//! short-circuits calls until `reset_timeout_secs` have passed. It then lets
//! calls through on probation and closes after `success_threshold` successes.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{RequestBuilder, StatusCode, Url};
use tracing::{debug, warn};

use core_kernel::{
    AdapterHealth, CircuitBreakerConfig, DomainPort, HealthCheckResult, HealthCheckable,
    OperationMetadata, PortError, TargetId,
};

use crate::ports::{PlaceDetails, PlaceLookupPort};

const ADAPTER_ID: &str = "http-place-lookup";
const API_KEY_HEADER: &str = "X-Api-Key";
const CORRELATION_HEADER: &str = "X-Correlation-Id";

#[derive(Debug, Clone)]
pub struct HttpPlaceLookupConfig {
    /// e.g. `https://places.example.com/v1`
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// `None` disables short-circuiting
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for HttpPlaceLookupConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: 10,
            circuit_breaker: Some(CircuitBreakerConfig::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed { failures: u32 },
    Open { since: Instant },
    Probing { successes: u32 },
}

#[derive(Debug)]
struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState::Closed { failures: 0 }),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut BreakerState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    /// Whether a call may go out now; moves an expired `Open` to `Probing`
    fn admits(&self) -> bool {
        let cool_down = Duration::from_secs(self.config.reset_timeout_secs);
        self.with_state(|state| match *state {
            BreakerState::Open { since } if since.elapsed() >= cool_down => {
                *state = BreakerState::Probing { successes: 0 };
                true
            }
            BreakerState::Open { .. } => false,
            _ => true,
        })
    }

    fn is_open(&self) -> bool {
        self.with_state(|state| matches!(state, BreakerState::Open { .. }))
    }

    fn on_success(&self) {
        let needed = self.config.success_threshold;
        self.with_state(|state| {
            *state = match *state {
                BreakerState::Probing { successes } if successes + 1 < needed => {
                    BreakerState::Probing { successes: successes + 1 }
                }
                BreakerState::Open { since } => BreakerState::Open { since },
                _ => BreakerState::Closed { failures: 0 },
            }
        })
    }

    fn on_transient_failure(&self) {
        let threshold = self.config.failure_threshold;
        let opened = self.with_state(|state| {
            let next = match *state {
                BreakerState::Closed { failures } if failures + 1 < threshold => {
                    BreakerState::Closed { failures: failures + 1 }
                }
                BreakerState::Open { since } => BreakerState::Open { since },
                _ => BreakerState::Open { since: Instant::now() },
            };
            let opened = !matches!(*state, BreakerState::Open { .. })
                && matches!(next, BreakerState::Open { .. });
            *state = next;
            opened
        });
        if opened {
            warn!(adapter = ADAPTER_ID, "Circuit opened for place provider");
        }
    }
}

/// Place provider client implementing [`PlaceLookupPort`]
///
/// ```rust,ignore
/// use domain_claims::adapters::{HttpPlaceLookup, HttpPlaceLookupConfig};
///
/// let lookup = HttpPlaceLookup::new(HttpPlaceLookupConfig {
///     base_url: "https://places.example.com/v1".to_string(),
///     api_key: "secret".to_string(),
///     ..Default::default()
/// })?;
/// let details = lookup.lookup_target(&target_id, None).await?;
/// ```
#[derive(Debug)]
pub struct HttpPlaceLookup {
    config: HttpPlaceLookupConfig,
    client: reqwest::Client,
    circuit_breaker: Option<CircuitBreaker>,
}

impl HttpPlaceLookup {
    pub fn new(config: HttpPlaceLookupConfig) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::internal(format!("Failed to build HTTP client: {}", e)))?;
        let circuit_breaker = config.circuit_breaker.clone().map(CircuitBreaker::new);

        Ok(Self {
            config,
            client,
            circuit_breaker,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn is_circuit_open(&self) -> bool {
        self.circuit_breaker.as_ref().is_some_and(CircuitBreaker::is_open)
    }

    /// `<base_url>/places/<target id>`, with the id escaped as one path segment
    fn place_url(&self, target_id: &TargetId) -> Result<Url, PortError> {
        let invalid_base = || {
            PortError::internal(format!("Invalid place provider URL '{}'", self.config.base_url))
        };
        let mut url = Url::parse(&self.config.base_url).map_err(|_| invalid_base())?;
        url.path_segments_mut()
            .map_err(|_| invalid_base())?
            .pop_if_empty()
            .push("places")
            .push(target_id.as_str());
        Ok(url)
    }

    fn request(
        &self,
        target_id: &TargetId,
        metadata: Option<&OperationMetadata>,
    ) -> Result<RequestBuilder, PortError> {
        let mut request = self
            .client
            .get(self.place_url(target_id)?)
            .header(API_KEY_HEADER, &self.config.api_key);
        if let Some(correlation_id) = metadata.and_then(|m| m.correlation_id.as_deref()) {
            request = request.header(CORRELATION_HEADER, correlation_id);
        }
        Ok(request)
    }

    async fn fetch(
        &self,
        target_id: &TargetId,
        metadata: Option<&OperationMetadata>,
    ) -> Result<PlaceDetails, PortError> {
        let request = self.request(target_id, metadata)?;
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        debug!(target_id = %target_id, status = %status, "Place provider responded");

        if status.is_success() {
            return response
                .json::<PlaceDetails>()
                .await
                .map_err(|e| PortError::Transformation {
                    message: format!("Invalid place details for {}: {}", target_id, e),
                });
        }

        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        Err(map_status(status, target_id, retry_after_secs))
    }

    fn transport_error(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: "place lookup".to_string(),
                duration_ms: self.config.timeout_secs * 1000,
            }
        } else {
            PortError::Connection {
                message: format!("Place provider unreachable: {}", error),
                source: Some(Box::new(error)),
            }
        }
    }
}

/// Maps a non-success provider status to a port error
fn map_status(status: StatusCode, target_id: &TargetId, retry_after_secs: u64) -> PortError {
    match status {
        StatusCode::NOT_FOUND => PortError::not_found("Place", target_id),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized {
            message: format!("Place provider rejected credentials ({})", status),
        },
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited { retry_after_secs },
        s if s.is_server_error() => PortError::ServiceUnavailable {
            service: format!("place provider ({})", s),
        },
        s => PortError::internal(format!("Unexpected place provider status {}", s)),
    }
}

impl DomainPort for HttpPlaceLookup {}

#[async_trait]
impl HealthCheckable for HttpPlaceLookup {
    async fn health_check(&self) -> HealthCheckResult {
        let (status, message) = if self.is_circuit_open() {
            (AdapterHealth::Degraded, Some("Circuit breaker is open".to_string()))
        } else {
            (AdapterHealth::Healthy, None)
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms: 0,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl PlaceLookupPort for HttpPlaceLookup {
    async fn lookup_target(
        &self,
        target_id: &TargetId,
        metadata: Option<OperationMetadata>,
    ) -> Result<PlaceDetails, PortError> {
        let Some(breaker) = &self.circuit_breaker else {
            return self.fetch(target_id, metadata.as_ref()).await;
        };
        if !breaker.admits() {
            return Err(PortError::ServiceUnavailable {
                service: "place provider (circuit open)".to_string(),
            });
        }

        let result = self.fetch(target_id, metadata.as_ref()).await;
        match &result {
            Err(e) if e.is_transient() => breaker.on_transient_failure(),
            _ => breaker.on_success(),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> TargetId {
        TargetId::new("place-42").unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert!(map_status(StatusCode::NOT_FOUND, &target(), 1).is_not_found());
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, &target(), 1),
            PortError::Unauthorized { .. }
        ));
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, &target(), 7),
            PortError::RateLimited { retry_after_secs: 7 }
        ));
        assert!(map_status(StatusCode::BAD_GATEWAY, &target(), 1).is_transient());
        assert!(!map_status(StatusCode::BAD_REQUEST, &target(), 1).is_transient());
    }

    fn lookup_at(base_url: &str) -> HttpPlaceLookup {
        HttpPlaceLookup::new(HttpPlaceLookupConfig {
            base_url: base_url.to_string(),
            api_key: "key-1".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_place_url_joins_base() {
        let url = lookup_at("https://places.test/v1/").place_url(&target()).unwrap();

        assert_eq!(url.as_str(), "https://places.test/v1/places/place-42");
    }

    #[test]
    fn test_place_url_escapes_reserved_characters() {
        let lookup = lookup_at("https://places.test/v1");

        let url = lookup.place_url(&TargetId::new("abc?key=x#frag").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://places.test/v1/places/abc%3Fkey=x%23frag");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = lookup.place_url(&TargetId::new("../admin/x").unwrap()).unwrap();
        assert_eq!(url.path(), "/v1/places/..%2Fadmin%2Fx");
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        let error = lookup_at("places.test/v1").place_url(&target()).unwrap_err();

        assert!(matches!(error, PortError::Internal { .. }));
    }

    #[test]
    fn test_request_carries_key_and_correlation_id() {
        let metadata = OperationMetadata::with_correlation_id("CLM-7");

        let request = lookup_at("https://places.test/v1")
            .request(&target(), Some(&metadata))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.headers()[API_KEY_HEADER], "key-1");
        assert_eq!(request.headers()[CORRELATION_HEADER], "CLM-7");
    }

    fn breaker(reset_timeout_secs: u64, success_threshold: u32) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            reset_timeout_secs,
            success_threshold,
        })
    }

    #[test]
    fn test_circuit_opens_after_threshold() {
        let cb = breaker(60, 1);

        cb.on_transient_failure();
        assert!(cb.admits());
        cb.on_transient_failure();
        assert!(!cb.admits());
        assert!(cb.is_open());
    }

    #[test]
    fn test_success_resets_failure_count() {
        let cb = breaker(60, 1);

        cb.on_transient_failure();
        cb.on_success();
        cb.on_transient_failure();

        assert!(cb.admits());
    }

    #[test]
    fn test_probing_closes_after_enough_successes() {
        let cb = breaker(0, 2);
        cb.on_transient_failure();
        cb.on_transient_failure();

        assert!(cb.admits());
        cb.on_success();
        assert_eq!(*cb.state.lock().unwrap(), BreakerState::Probing { successes: 1 });
        cb.on_success();
        assert_eq!(*cb.state.lock().unwrap(), BreakerState::Closed { failures: 0 });
    }

    #[test]
    fn test_failure_while_probing_reopens() {
        let cb = breaker(0, 3);
        cb.on_transient_failure();
        cb.on_transient_failure();
        assert!(cb.admits());

        cb.on_transient_failure();

        assert!(cb.is_open());
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transient() {
        let lookup = HttpPlaceLookup::new(HttpPlaceLookupConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            circuit_breaker: None,
            ..Default::default()
        })
        .unwrap();

        let error = lookup.lookup_target(&target(), None).await.unwrap_err();
        assert!(error.is_transient());
    }
}
