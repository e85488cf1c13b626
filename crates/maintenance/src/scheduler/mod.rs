//! Owned cron engine with explicit start/stop.
//!
//! Each registered entry runs in its own task: it sleeps until the next
//! occurrence of its schedule and awaits the job in place, so an entry never
//! overlaps with itself while different entries fire independently. Stopping
//! signals every task and waits, bounded by a timeout, for in-flight jobs.

mod core;
mod entry;
mod error;

#[cfg(test)]
mod tests;

pub use self::core::CronScheduler;
pub use self::entry::{CronJob, EntryId, JobFuture, ScheduleEntry};
pub use self::error::SchedulerError;
