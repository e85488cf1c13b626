use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::identity::MaintenanceIdentity;

// ── Maintenance file ──────────────────────────────────────────

/// Top-level shape of the maintenance YAML file.
///
/// ```yaml
/// maintenances:
///   - matchers: ["alertname=Watchdog"]
///     schedule: "0 3 * * *"
///     duration: 30m
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceFile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintenances: Vec<MaintenanceSpec>,
}

impl MaintenanceFile {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document is a file with no maintenances, not an error.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }
}

// ── Single maintenance ────────────────────────────────────────

/// One maintenance entry exactly as written in configuration.
///
/// Kept verbatim because the identity is computed from this text and the
/// status board echoes it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceSpec {
    pub matchers: Vec<String>,
    pub schedule: String,
    pub duration: String,
}

impl MaintenanceSpec {
    pub fn identity(&self) -> MaintenanceIdentity {
        MaintenanceIdentity::compute(&self.matchers, &self.schedule, &self.duration)
    }
}
