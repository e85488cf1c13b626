//! [`CronScheduler`]: runs registered entries until stopped.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::schedule::MaintenanceSchedule;

use super::entry::{CronJob, EntryId, ScheduleEntry};
use super::error::SchedulerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Stopped,
}

struct Runtime {
    state: State,
    tasks: Vec<JoinHandle<()>>,
}

/// Cron engine owning one task per entry once started.
///
/// Lock order is `runtime` then `entries`; neither is held across an await.
pub struct CronScheduler {
    clock: Arc<dyn Clock>,
    entries: RwLock<Vec<Arc<ScheduleEntry>>>,
    runtime: Mutex<Runtime>,
    shutdown: watch::Sender<bool>,
}

impl CronScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            clock,
            entries: RwLock::new(Vec::new()),
            runtime: Mutex::new(Runtime {
                state: State::Idle,
                tasks: Vec::new(),
            }),
            shutdown,
        }
    }

    /// Register a job. If the scheduler is already running the entry starts
    /// immediately; after [`stop`](Self::stop) it is recorded but never fires.
    pub fn schedule(
        &self,
        name: impl Into<String>,
        schedule: MaintenanceSchedule,
        job: CronJob,
    ) -> EntryId {
        let mut runtime = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        let id = EntryId(entries.len());
        let entry = Arc::new(ScheduleEntry {
            id,
            name: name.into(),
            schedule,
            job,
        });
        entries.push(entry.clone());
        drop(entries);

        if runtime.state == State::Running {
            let handle = self.spawn_entry(entry);
            runtime.tasks.push(handle);
        }
        id
    }

    pub fn entry(&self, id: EntryId) -> Option<Arc<ScheduleEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
            .cloned()
    }

    /// Next occurrence of an entry strictly after `now`.
    pub fn next_for(&self, id: EntryId, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.entry(id).and_then(|e| e.schedule.next(now))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_running(&self) -> bool {
        self.runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            == State::Running
    }

    /// Spawn a task per registered entry. Must be called inside a tokio runtime.
    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut runtime = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);
        match runtime.state {
            State::Running => return Err(SchedulerError::AlreadyRunning),
            State::Stopped => return Err(SchedulerError::Stopped),
            State::Idle => {}
        }

        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        for entry in entries.iter() {
            let handle = self.spawn_entry(entry.clone());
            runtime.tasks.push(handle);
        }
        runtime.state = State::Running;
        info!(entries = entries.len(), "cron scheduler started");
        Ok(())
    }

    /// Signal every entry task and wait for in-flight jobs.
    ///
    /// Tasks still running after `timeout` are left to finish on their own;
    /// none of them will fire again.
    pub async fn stop(&self, timeout: Duration) -> Result<(), SchedulerError> {
        self.shutdown.send_replace(true);
        let tasks = {
            let mut runtime = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);
            runtime.state = State::Stopped;
            std::mem::take(&mut runtime.tasks)
        };

        info!(tasks = tasks.len(), timeout = ?timeout, "stopping cron scheduler");
        let join_all = async {
            for task in tasks {
                if let Err(e) = task.await {
                    warn!(error = %e, "cron entry task failed");
                }
            }
        };
        tokio::time::timeout(timeout, join_all)
            .await
            .map_err(|_| SchedulerError::StopTimeout(timeout))
    }

    fn spawn_entry(&self, entry: Arc<ScheduleEntry>) -> JoinHandle<()> {
        tokio::spawn(run_entry(
            entry,
            self.clock.clone(),
            self.shutdown.subscribe(),
        ))
    }
}

impl Drop for CronScheduler {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

async fn run_entry(
    entry: Arc<ScheduleEntry>,
    clock: Arc<dyn Clock>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut last_fire: Option<DateTime<Utc>> = None;

    loop {
        if *shutdown.borrow() {
            break;
        }

        // Never schedule at or before the previous fire, even if the clock
        // reports a slightly earlier time after waking.
        let now = clock.now();
        let from = last_fire.map_or(now, |last| last.max(now));
        let Some(next) = entry.schedule.next(from) else {
            debug!(entry = %entry.name, "schedule has no further occurrences");
            break;
        };

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => break,
        }

        last_fire = Some(next);
        debug!(entry = %entry.name, scheduled = %next, "cron entry fired");
        (entry.job)().await;
    }
}
