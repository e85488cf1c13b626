//! Immutable maintenance definitions.

use std::time::Duration;

use chrono::{DateTime, Utc};
use silencer_core::{parse_duration, ConfigError, MaintenanceIdentity, MaintenanceSpec, Matcher};

use crate::schedule::MaintenanceSchedule;

/// A validated maintenance: which alerts to silence, when, and for how long.
///
/// Built once from configuration and never mutated.
#[derive(Debug, Clone)]
pub struct Maintenance {
    pub identity: MaintenanceIdentity,
    pub matchers: Vec<Matcher>,
    pub schedule: MaintenanceSchedule,
    pub duration: Duration,
}

impl Maintenance {
    /// Validate a configuration entry.
    ///
    /// Fails on any unparseable matcher, schedule or duration, and on a zero
    /// duration (the backend rejects empty silence windows).
    pub fn from_spec(spec: &MaintenanceSpec) -> Result<Self, ConfigError> {
        let matchers = Matcher::parse_all(&spec.matchers)?;
        let schedule = MaintenanceSchedule::parse(&spec.schedule)?;
        let duration = parse_duration(&spec.duration)?;
        if duration.is_zero() {
            return Err(ConfigError::Duration {
                input: spec.duration.clone(),
                reason: "duration must be positive".to_string(),
            });
        }

        Ok(Self {
            identity: spec.identity(),
            matchers,
            schedule,
            duration,
        })
    }

    /// See [`MaintenanceSchedule::active_at`].
    pub fn active_at(&self, t: DateTime<Utc>) -> (bool, Option<DateTime<Utc>>) {
        self.schedule.active_at(t, self.duration)
    }
}
