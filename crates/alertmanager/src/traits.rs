//! Silence gateway trait definition and shared error types.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use silencer_core::Matcher;

/// Errors that can occur while talking to the alerting backend.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("alertmanager returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid alertmanager URL: {0}")]
    Url(String),

    #[error("silence window out of range: {0}")]
    Window(String),
}

/// Opaque silence identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SilenceId(String);

impl SilenceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SilenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A silence to register: suppresses `matchers` over `[starts_at, starts_at + duration)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Silence {
    pub matchers: Vec<Matcher>,
    pub starts_at: DateTime<Utc>,
    pub duration: Duration,
    pub comment: String,
    pub created_by: String,
}

impl Silence {
    pub fn ends_at(&self) -> Result<DateTime<Utc>, GatewayError> {
        chrono::Duration::from_std(self.duration)
            .ok()
            .and_then(|d| self.starts_at.checked_add_signed(d))
            .ok_or_else(|| GatewayError::Window(format!("{:?} after {}", self.duration, self.starts_at)))
    }
}

/// A non-expired silence created by this service, as reported by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSilence {
    pub id: SilenceId,
    pub matchers: Vec<Matcher>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Free-text comment; expected to hold a maintenance identity.
    pub comment: String,
    pub created_by: String,
}

/// Capability the orchestrator needs from the alerting backend.
///
/// Implementations never retry; callers decide whether a failure is fatal.
#[async_trait::async_trait]
pub trait SilenceGateway: Send + Sync {
    /// Register a silence and return the backend-assigned id.
    async fn create(&self, silence: &Silence) -> Result<SilenceId, GatewayError>;

    /// Remove (expire) a silence by id.
    async fn delete(&self, id: &SilenceId) -> Result<(), GatewayError>;

    /// List non-expired silences whose `createdBy` equals `created_by`.
    async fn active_silences(&self, created_by: &str) -> Result<Vec<ActiveSilence>, GatewayError>;
}
