//! Deterministic fakes for the orchestrator's capabilities.
//!
//! Enabled for this crate's tests and, via the `testing` feature, for
//! dependents that need an engine without a live Alertmanager.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use silencer_alertmanager::{ActiveSilence, GatewayError, Silence, SilenceGateway, SilenceId};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::clock::Clock;

/// Clock that advances with tokio's (possibly paused) virtual time.
///
/// Must be built inside a runtime so the base instant follows its clock.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    origin: DateTime<Utc>,
    base: Instant,
}

impl VirtualClock {
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            base: Instant::now(),
        }
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.base.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin + elapsed
    }
}

/// In-memory silence backend recording every call.
#[derive(Debug, Default)]
pub struct MockGateway {
    remote: Mutex<Vec<ActiveSilence>>,
    created: Mutex<Vec<Silence>>,
    deleted: Mutex<Vec<SilenceId>>,
    list_calls: AtomicUsize,
    next_id: AtomicUsize,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
    fail_list: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a remote silence as if created earlier; returns its id.
    pub async fn seed(
        &self,
        comment: &str,
        created_by: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> SilenceId {
        let id = self.allocate_id();
        self.remote.lock().await.push(ActiveSilence {
            id: id.clone(),
            matchers: Vec::new(),
            starts_at,
            ends_at,
            comment: comment.to_string(),
            created_by: created_by.to_string(),
        });
        id
    }

    pub async fn created(&self) -> Vec<Silence> {
        self.created.lock().await.clone()
    }

    pub async fn deleted(&self) -> Vec<SilenceId> {
        self.deleted.lock().await.clone()
    }

    /// Silences currently held by the backend.
    pub async fn remaining(&self) -> Vec<ActiveSilence> {
        self.remote.lock().await.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    fn allocate_id(&self) -> SilenceId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        SilenceId::new(format!("silence-{n}"))
    }

    fn injected() -> GatewayError {
        GatewayError::Status {
            status: 503,
            body: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl SilenceGateway for MockGateway {
    async fn create(&self, silence: &Silence) -> Result<SilenceId, GatewayError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        let ends_at = silence.ends_at()?;
        let id = self.allocate_id();
        self.created.lock().await.push(silence.clone());
        self.remote.lock().await.push(ActiveSilence {
            id: id.clone(),
            matchers: silence.matchers.clone(),
            starts_at: silence.starts_at,
            ends_at,
            comment: silence.comment.clone(),
            created_by: silence.created_by.clone(),
        });
        Ok(id)
    }

    async fn delete(&self, id: &SilenceId) -> Result<(), GatewayError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        let mut remote = self.remote.lock().await;
        let before = remote.len();
        remote.retain(|s| &s.id != id);
        if remote.len() == before {
            return Err(GatewayError::Status {
                status: 404,
                body: format!("silence {id} not found"),
            });
        }
        drop(remote);
        self.deleted.lock().await.push(id.clone());
        Ok(())
    }

    async fn active_silences(&self, created_by: &str) -> Result<Vec<ActiveSilence>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        Ok(self
            .remote
            .lock()
            .await
            .iter()
            .filter(|s| s.created_by == created_by)
            .cloned()
            .collect())
    }
}
