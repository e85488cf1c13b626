//! Maintenance orchestrator: aligns remote silences with configuration on
//! startup, then creates and expires silences as cron windows open.
//!
//! Per maintenance the lifecycle is `Idle -> Suppressing -> Idle`, driven by
//! [`activate`](core::Inner::activate) (cron fire or startup restore) and a
//! one-shot expiry armed for every silence it creates.

mod core;
mod error;
mod expiry;
mod reconcile;


use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::definition::Maintenance;

pub use self::core::MaintenanceOrchestrator;
pub use self::error::OrchestratorError;
pub use self::reconcile::ReconcileSummary;

/// Point-in-time view of one configured maintenance.
#[derive(Debug, Clone)]
pub struct WatchedMaintenance {
    pub maintenance: Arc<Maintenance>,
    /// Next occurrence after the time of the snapshot.
    pub next: Option<DateTime<Utc>>,
    pub is_active: bool,
}
