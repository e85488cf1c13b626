//! Content-addressed maintenance identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deterministic identity of a maintenance definition.
///
/// Derived from the configuration text only (matchers joined by `,`, then the
/// schedule expression, then the duration literal) as a UUID v5 in the nil
/// namespace. The hyphenated form is written into the silence comment and is
/// the only key that ties a remote silence back to its maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaintenanceIdentity(Uuid);

impl MaintenanceIdentity {
    pub fn compute<S: AsRef<str>>(matchers: &[S], schedule: &str, duration: &str) -> Self {
        let joined = matchers
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        let value = format!("{joined}{schedule}{duration}");
        Self(Uuid::new_v5(&Uuid::nil(), value.as_bytes()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MaintenanceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for MaintenanceIdentity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for MaintenanceIdentity {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
