//! Alertmanager API v2 silence payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use silencer_core::Matcher;

/// Body of `POST /api/v2/silences`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostableSilence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub matchers: Vec<Matcher>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_by: String,
    pub comment: String,
}

/// Response of `POST /api/v2/silences`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostSilenceResponse {
    #[serde(rename = "silenceID")]
    pub silence_id: String,
}

/// One element of `GET /api/v2/silences`.
///
/// Optional fields mirror what older or misbehaving backends may omit; the
/// gateway filters incomplete records out rather than failing the listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GettableSilence {
    pub id: Option<String>,
    pub status: Option<SilenceStatus>,
    #[serde(default)]
    pub matchers: Vec<Matcher>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub comment: Option<String>,
}

impl GettableSilence {
    pub fn is_expired(&self) -> bool {
        matches!(
            self.status,
            Some(SilenceStatus {
                state: SilenceState::Expired
            })
        )
    }

    pub fn is_created_by(&self, created_by: &str) -> bool {
        self.created_by.as_deref() == Some(created_by)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SilenceStatus {
    pub state: SilenceState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SilenceState {
    Active,
    Pending,
    Expired,
    #[serde(other)]
    Unknown,
}
