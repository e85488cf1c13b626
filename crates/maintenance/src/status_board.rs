//! Human-readable projection of every watched maintenance.

use std::string::FromUtf8Error;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use silencer_core::MaintenanceSpec;
use tracing::warn;

use crate::loader::MaintenanceIndex;
use crate::orchestrator::{MaintenanceOrchestrator, WatchedMaintenance};

/// Anything that can report the current state of its maintenances.
pub trait WatchedMaintenanceSource: Send + Sync {
    fn watched_maintenances(&self) -> Vec<WatchedMaintenance>;
}

impl WatchedMaintenanceSource for MaintenanceOrchestrator {
    fn watched_maintenances(&self) -> Vec<WatchedMaintenance> {
        MaintenanceOrchestrator::watched_maintenances(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("rendered YAML is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusRecord<'a> {
    maintenance: &'a MaintenanceSpec,
    next: Option<String>,
    is_active: bool,
}

/// Renders the watched maintenances as a multi-document YAML stream, echoing
/// each entry as it was written in configuration.
pub struct StatusBoard {
    source: Arc<dyn WatchedMaintenanceSource>,
    index: MaintenanceIndex,
}

impl StatusBoard {
    pub fn new(source: Arc<dyn WatchedMaintenanceSource>, index: MaintenanceIndex) -> Self {
        Self { source, index }
    }

    /// One document per maintenance, separated by `---`. No maintenances
    /// renders as an empty string.
    pub fn render(&self) -> Result<String, RenderError> {
        let watched = self.source.watched_maintenances();
        let mut ser = serde_yaml::Serializer::new(Vec::new());
        let mut written = 0;

        for w in &watched {
            let Some(spec) = self.index.get(&w.maintenance.identity) else {
                warn!(maintenance = %w.maintenance.identity, "maintenance missing from index");
                continue;
            };
            let record = StatusRecord {
                maintenance: spec,
                next: w.next.map(format_next),
                is_active: w.is_active,
            };
            record.serialize(&mut ser)?;
            written += 1;
        }

        if written == 0 {
            return Ok(String::new());
        }
        Ok(String::from_utf8(ser.into_inner()?)?)
    }
}

fn format_next(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
