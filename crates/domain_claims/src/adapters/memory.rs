//! In-memory adapters
//!
//! Process-local implementations of the claim ports for tests and local
//! runs. [`InMemoryClaimStore`] honours the same transaction contract as the
//! PostgreSQL store: one writer at a time, writes staged until commit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use core_kernel::{
    AccountId, AdapterHealth, ClaimId, DomainPort, HealthCheckResult, HealthCheckable,
    OperationMetadata, PortError, TargetId,
};

use crate::claim::{Claim, ClaimStatus};
use crate::ports::{
    ClaimStore, ClaimTransaction, NotificationPort, PlaceDetails, PlaceLookupPort, ReviewNotice,
};

fn healthy(adapter_id: &str) -> HealthCheckResult {
    HealthCheckResult {
        adapter_id: adapter_id.to_string(),
        status: AdapterHealth::Healthy,
        latency_ms: 0,
        message: None,
        checked_at: Utc::now(),
    }
}

/// Newest first; the v7 id breaks ties between equal timestamps
fn newest_first(mut claims: Vec<Claim>) -> Vec<Claim> {
    claims.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
    claims
}

type ClaimMap = HashMap<ClaimId, Claim>;

/// In-memory implementation of [`ClaimStore`]
#[derive(Debug, Default, Clone)]
pub struct InMemoryClaimStore {
    claims: Arc<RwLock<ClaimMap>>,
    writer: Arc<Mutex<()>>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates with claims, bypassing the exclusivity checks
    pub async fn with_claims(claims: Vec<Claim>) -> Self {
        let store = Self::new();
        {
            let mut map = store.claims.write().await;
            for claim in claims {
                map.insert(claim.id, claim);
            }
        }
        store
    }

    pub async fn len(&self) -> usize {
        self.claims.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.claims.read().await.is_empty()
    }

    async fn select(&self, filter: impl Fn(&Claim) -> bool) -> Vec<Claim> {
        let claims = self
            .claims
            .read()
            .await
            .values()
            .filter(|c| filter(c))
            .cloned()
            .collect();
        newest_first(claims)
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl HealthCheckable for InMemoryClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        healthy("in-memory-claim-store")
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn begin(&self) -> Result<Box<dyn ClaimTransaction>, PortError> {
        let writer = self.writer.clone().lock_owned().await;
        Ok(Box::new(InMemoryClaimTransaction {
            _writer: writer,
            claims: self.claims.clone(),
            staged: HashMap::new(),
        }))
    }

    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        Ok(self.claims.read().await.get(&id).cloned())
    }

    async fn list_by_claimant(&self, claimant_id: AccountId) -> Result<Vec<Claim>, PortError> {
        Ok(self.select(|c| c.claimant_id == claimant_id).await)
    }

    async fn list_by_target(&self, target_id: &TargetId) -> Result<Vec<Claim>, PortError> {
        Ok(self.select(|c| &c.target_id == target_id).await)
    }

    async fn list(&self, status: Option<ClaimStatus>) -> Result<Vec<Claim>, PortError> {
        Ok(self.select(|c| status.map_or(true, |s| c.status == s)).await)
    }
}

/// Holds the store-wide writer lock until commit or drop
struct InMemoryClaimTransaction {
    _writer: OwnedMutexGuard<()>,
    claims: Arc<RwLock<ClaimMap>>,
    /// `None` marks a staged delete
    staged: HashMap<ClaimId, Option<Claim>>,
}

impl InMemoryClaimTransaction {
    async fn current(&self, id: ClaimId) -> Option<Claim> {
        match self.staged.get(&id) {
            Some(staged) => staged.clone(),
            None => self.claims.read().await.get(&id).cloned(),
        }
    }
}

#[async_trait]
impl ClaimTransaction for InMemoryClaimTransaction {
    async fn find(&mut self, id: ClaimId) -> Result<Option<Claim>, PortError> {
        Ok(self.current(id).await)
    }

    async fn lock_target(&mut self, target_id: &TargetId) -> Result<Vec<Claim>, PortError> {
        let mut view: HashMap<ClaimId, Claim> = self
            .claims
            .read()
            .await
            .values()
            .filter(|c| &c.target_id == target_id)
            .map(|c| (c.id, c.clone()))
            .collect();

        for (id, staged) in &self.staged {
            match staged {
                Some(claim) if &claim.target_id == target_id => {
                    view.insert(*id, claim.clone());
                }
                _ => {
                    view.remove(id);
                }
            }
        }
        Ok(newest_first(view.into_values().collect()))
    }

    async fn insert(&mut self, claim: &Claim) -> Result<(), PortError> {
        if self.current(claim.id).await.is_some() {
            return Err(PortError::conflict(format!("Claim {} already exists", claim.id)));
        }
        self.staged.insert(claim.id, Some(claim.clone()));
        Ok(())
    }

    async fn update(&mut self, claim: &Claim) -> Result<(), PortError> {
        if self.current(claim.id).await.is_none() {
            return Err(PortError::not_found("Claim", claim.id));
        }
        self.staged.insert(claim.id, Some(claim.clone()));
        Ok(())
    }

    async fn delete(&mut self, id: ClaimId) -> Result<(), PortError> {
        if self.current(id).await.is_none() {
            return Err(PortError::not_found("Claim", id));
        }
        self.staged.insert(id, None);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        let Self {
            _writer,
            claims,
            staged,
        } = *self;
        let mut claims = claims.write().await;
        for (id, staged) in staged {
            match staged {
                Some(claim) => {
                    claims.insert(id, claim);
                }
                None => {
                    claims.remove(&id);
                }
            }
        }
        debug!(claims = claims.len(), "In-memory claim transaction committed");
        Ok(())
    }
}

/// In-memory place provider with an availability switch
#[derive(Debug, Clone)]
pub struct InMemoryPlaceDirectory {
    places: Arc<RwLock<HashMap<TargetId, PlaceDetails>>>,
    available: Arc<AtomicBool>,
    lookups: Arc<AtomicUsize>,
    correlation_ids: Arc<RwLock<Vec<String>>>,
}

impl Default for InMemoryPlaceDirectory {
    fn default() -> Self {
        Self {
            places: Arc::default(),
            available: Arc::new(AtomicBool::new(true)),
            lookups: Arc::default(),
            correlation_ids: Arc::default(),
        }
    }
}

impl InMemoryPlaceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, target_id: TargetId, details: PlaceDetails) {
        self.places.write().await.insert(target_id, details);
    }

    /// When unavailable every lookup fails with `ServiceUnavailable`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of lookups served or refused so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Correlation ids received, in call order
    pub async fn correlation_ids(&self) -> Vec<String> {
        self.correlation_ids.read().await.clone()
    }
}

impl DomainPort for InMemoryPlaceDirectory {}

#[async_trait]
impl HealthCheckable for InMemoryPlaceDirectory {
    async fn health_check(&self) -> HealthCheckResult {
        let mut result = healthy("in-memory-place-directory");
        if !self.available.load(Ordering::SeqCst) {
            result.status = AdapterHealth::Unhealthy;
            result.message = Some("Directory switched off".to_string());
        }
        result
    }
}

#[async_trait]
impl PlaceLookupPort for InMemoryPlaceDirectory {
    async fn lookup_target(
        &self,
        target_id: &TargetId,
        metadata: Option<OperationMetadata>,
    ) -> Result<PlaceDetails, PortError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(id) = metadata.and_then(|m| m.correlation_id) {
            self.correlation_ids.write().await.push(id);
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(PortError::ServiceUnavailable {
                service: "in-memory place directory".to_string(),
            });
        }
        self.places
            .read()
            .await
            .get(target_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Place", target_id))
    }
}

/// Notification port that keeps every dispatched notice
#[derive(Debug, Clone, Default)]
pub struct InMemoryOutbox {
    notices: Arc<RwLock<Vec<ReviewNotice>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent dispatch fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn notices(&self) -> Vec<ReviewNotice> {
        self.notices.read().await.clone()
    }
}

impl DomainPort for InMemoryOutbox {}

#[async_trait]
impl NotificationPort for InMemoryOutbox {
    async fn dispatch(&self, notice: &ReviewNotice) -> Result<(), PortError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Connection {
                message: "outbox unavailable".to_string(),
                source: None,
            });
        }
        self.notices.write().await.push(notice.clone());
        Ok(())
    }
}
