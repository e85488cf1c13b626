//! Maintenance window reconciliation and scheduling engine.
//!
//! This crate provides:
//! - Cron schedule evaluation with "is this window active now" answers
//! - Maintenance definitions built from YAML configuration
//! - A concurrent active-maintenance store
//! - An owned cron scheduler with explicit start/stop
//! - The orchestrator that reconciles remote silences on startup and drives
//!   the recurring activate/expire cycle
//! - A status board projection for display

pub mod clock;
pub mod definition;
pub mod loader;
pub mod orchestrator;
pub mod schedule;
pub mod scheduler;
pub mod status_board;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use definition::Maintenance;
pub use loader::{MaintenanceConfig, MaintenanceIndex};
pub use orchestrator::{
    MaintenanceOrchestrator, OrchestratorError, ReconcileSummary, WatchedMaintenance,
};
pub use schedule::{MaintenanceSchedule, ScheduleError};
pub use scheduler::{CronJob, CronScheduler, EntryId, SchedulerError};
pub use status_board::{RenderError, StatusBoard, WatchedMaintenanceSource};
pub use store::{ActiveMaintenanceStore, InMemoryActiveStore};
