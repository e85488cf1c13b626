//! [`MaintenanceOrchestrator`]: owns the definitions, the cron engine and the
//! pending expiries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use silencer_alertmanager::SilenceGateway;
use tracing::info;

use crate::clock::Clock;
use crate::definition::Maintenance;
use crate::scheduler::{CronJob, CronScheduler, EntryId, JobFuture};
use crate::store::ActiveMaintenanceStore;

use super::expiry::PendingExpiries;
use super::reconcile::ReconcileSummary;
use super::{OrchestratorError, WatchedMaintenance};

/// State shared with cron jobs and expiry tasks.
pub(crate) struct Inner {
    pub(crate) service_name: String,
    pub(crate) maintenances: Vec<Arc<Maintenance>>,
    pub(crate) store: Arc<dyn ActiveMaintenanceStore>,
    pub(crate) gateway: Arc<dyn SilenceGateway>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) expiries: PendingExpiries,
}

pub struct MaintenanceOrchestrator {
    inner: Arc<Inner>,
    scheduler: CronScheduler,
    /// Cron entry per maintenance, same order as `inner.maintenances`.
    entries: OnceLock<Vec<EntryId>>,
    started: AtomicBool,
}

impl MaintenanceOrchestrator {
    /// `service_name` is written as the author of every silence and is the
    /// filter used to find them again on restart.
    pub fn new(
        service_name: impl Into<String>,
        maintenances: Vec<Maintenance>,
        store: Arc<dyn ActiveMaintenanceStore>,
        gateway: Arc<dyn SilenceGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let scheduler = CronScheduler::new(clock.clone());
        Self {
            inner: Arc::new(Inner {
                service_name: service_name.into(),
                maintenances: maintenances.into_iter().map(Arc::new).collect(),
                store,
                gateway,
                clock,
                expiries: PendingExpiries::default(),
            }),
            scheduler,
            entries: OnceLock::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Reconcile, then arm one cron entry per maintenance.
    ///
    /// Nothing is scheduled until reconciliation has succeeded. A failed start
    /// may be retried; a successful one may not.
    pub async fn start(&self) -> Result<(), OrchestratorError> {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(OrchestratorError::AlreadyStarted);
        }

        if let Err(e) = self.inner.reconcile().await {
            self.started.store(false, Ordering::SeqCst);
            return Err(e);
        }

        let ids = self
            .inner
            .maintenances
            .iter()
            .map(|maintenance| {
                self.scheduler.schedule(
                    maintenance.identity.to_string(),
                    maintenance.schedule.clone(),
                    self.activation_job(maintenance.clone()),
                )
            })
            .collect();
        // `started` guarantees this runs at most once.
        let _ = self.entries.set(ids);

        self.scheduler.start()?;
        info!(
            service = %self.inner.service_name,
            maintenances = self.inner.maintenances.len(),
            "orchestrator started"
        );
        Ok(())
    }

    /// One reconciliation pass without arming the scheduler. Safe to repeat:
    /// against unchanged remote state a second pass creates and deletes nothing.
    pub async fn reconcile(&self) -> Result<ReconcileSummary, OrchestratorError> {
        self.inner.reconcile().await
    }

    /// Stop firing cron entries, waiting up to `timeout` for in-flight ones.
    /// Armed expiries keep running.
    pub async fn stop(&self, timeout: Duration) -> Result<(), OrchestratorError> {
        self.scheduler.stop(timeout).await?;
        info!("orchestrator stopped");
        Ok(())
    }

    pub fn watched_maintenances(&self) -> Vec<WatchedMaintenance> {
        let now = self.inner.clock.now();
        let entries = self.entries.get();

        self.inner
            .maintenances
            .iter()
            .enumerate()
            .map(|(i, maintenance)| {
                let next = match entries.and_then(|ids| ids.get(i)) {
                    Some(id) => self.scheduler.next_for(*id, now),
                    None => maintenance.schedule.next(now),
                };
                WatchedMaintenance {
                    maintenance: maintenance.clone(),
                    next,
                    is_active: self.inner.store.is_active(&maintenance.identity),
                }
            })
            .collect()
    }

    /// Armed expiry timers that have not fired yet.
    pub fn pending_expiries(&self) -> usize {
        self.inner.expiries.len()
    }

    pub fn maintenance_count(&self) -> usize {
        self.inner.maintenances.len()
    }

    pub fn active_count(&self) -> usize {
        self.inner
            .maintenances
            .iter()
            .filter(|m| self.inner.store.is_active(&m.identity))
            .count()
    }

    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    fn activation_job(&self, maintenance: Arc<Maintenance>) -> CronJob {
        let inner = self.inner.clone();
        Arc::new(move || -> JobFuture {
            let inner = inner.clone();
            let maintenance = maintenance.clone();
            Box::pin(async move {
                let now = inner.clock.now();
                inner.activate(&maintenance, now).await;
            })
        })
    }
}
