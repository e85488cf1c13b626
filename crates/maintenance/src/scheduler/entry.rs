//! Registered cron entry type.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::schedule::MaintenanceSchedule;

pub type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Callback invoked on every occurrence.
pub type CronJob = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// Handle returned by [`CronScheduler::schedule`](super::CronScheduler::schedule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) usize);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

pub struct ScheduleEntry {
    pub id: EntryId,
    /// Label used in logs.
    pub name: String,
    pub schedule: MaintenanceSchedule,
    pub(crate) job: CronJob,
}

impl fmt::Debug for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("schedule", &self.schedule.expression())
            .finish_non_exhaustive()
    }
}
