//! Shared application state for HTTP handlers.

use std::sync::Arc;

use silencer_maintenance::{MaintenanceOrchestrator, StatusBoard};

pub struct AppState {
    pub orchestrator: Arc<MaintenanceOrchestrator>,
    pub board: StatusBoard,
}
