//! Build maintenance definitions from the YAML configuration file.

use std::collections::HashMap;
use std::path::Path;

use silencer_core::{ConfigError, MaintenanceFile, MaintenanceIdentity, MaintenanceSpec};
use tracing::info;

use crate::definition::Maintenance;

/// Identity → configuration entry as written, for display.
pub type MaintenanceIndex = HashMap<MaintenanceIdentity, MaintenanceSpec>;

/// Validated configuration: definitions in file order plus the text index.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceConfig {
    pub maintenances: Vec<Maintenance>,
    pub index: MaintenanceIndex,
}

impl MaintenanceConfig {
    /// Read and validate a maintenance file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::from_file(MaintenanceFile::load(path)?)?;
        info!(
            path = %path.display(),
            maintenances = config.maintenances.len(),
            "loaded maintenance config"
        );
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::from_file(MaintenanceFile::from_yaml_str(yaml)?)
    }

    /// Validate every entry; the first invalid or duplicated one aborts.
    ///
    /// Two entries with identical text share an identity and would race on the
    /// same remote silence, so they are rejected.
    pub fn from_file(file: MaintenanceFile) -> Result<Self, ConfigError> {
        let mut maintenances = Vec::with_capacity(file.maintenances.len());
        let mut index = MaintenanceIndex::with_capacity(file.maintenances.len());

        for spec in file.maintenances {
            let maintenance = Maintenance::from_spec(&spec)?;
            if index.insert(maintenance.identity, spec).is_some() {
                return Err(ConfigError::Duplicate(maintenance.identity.to_string()));
            }
            maintenances.push(maintenance);
        }

        Ok(Self {
            maintenances,
            index,
        })
    }
}
