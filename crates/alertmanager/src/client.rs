//! Alertmanager API v2 gateway over HTTP.

use std::time::Duration;

use url::Url;

use crate::models::{GettableSilence, PostSilenceResponse, PostableSilence};
use crate::traits::{ActiveSilence, GatewayError, Silence, SilenceGateway, SilenceId};

/// [`SilenceGateway`] backed by the Alertmanager v2 REST API.
///
/// Timestamps are sent in UTC. Listing is filtered client-side because the
/// API has no server-side filter on `createdBy` or status.
#[derive(Debug, Clone)]
pub struct AlertmanagerClient {
    /// Base URL, always ending in `/` so relative joins keep any path prefix.
    base_url: Url,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl AlertmanagerClient {
    /// Create a client for the Alertmanager at `base_url`.
    ///
    /// `request_timeout` bounds every request end to end.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, GatewayError> {
        let mut url =
            Url::parse(base_url).map_err(|e| GatewayError::Url(format!("{base_url}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(GatewayError::Url(format!("{base_url}: not a base URL")));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            base_url: url,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::Url(format!("{path}: {e}")))
    }

    fn silence_url(&self, id: &SilenceId) -> Result<Url, GatewayError> {
        let mut url = self.endpoint("api/v2/silence")?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Url(self.base_url.to_string()))?
            .push(id.as_str());
        Ok(url)
    }
}

/// Turn a non-2xx response into [`GatewayError::Status`], keeping the body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(GatewayError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

#[async_trait::async_trait]
impl SilenceGateway for AlertmanagerClient {
    async fn create(&self, silence: &Silence) -> Result<SilenceId, GatewayError> {
        let body = PostableSilence {
            id: None,
            matchers: silence.matchers.clone(),
            starts_at: silence.starts_at,
            ends_at: silence.ends_at()?,
            created_by: silence.created_by.clone(),
            comment: silence.comment.clone(),
        };

        let response = self
            .client
            .post(self.endpoint("api/v2/silences")?)
            .json(&body)
            .send()
            .await?;
        let created: PostSilenceResponse = check_status(response).await?.json().await?;

        tracing::debug!(
            silence_id = %created.silence_id,
            starts_at = %body.starts_at,
            ends_at = %body.ends_at,
            "silence created"
        );
        Ok(SilenceId::new(created.silence_id))
    }

    async fn delete(&self, id: &SilenceId) -> Result<(), GatewayError> {
        let response = self.client.delete(self.silence_url(id)?).send().await?;
        check_status(response).await?;
        tracing::debug!(silence_id = %id, "silence deleted");
        Ok(())
    }

    async fn active_silences(&self, created_by: &str) -> Result<Vec<ActiveSilence>, GatewayError> {
        let response = self
            .client
            .get(self.endpoint("api/v2/silences")?)
            .send()
            .await?;
        let silences: Vec<GettableSilence> = check_status(response).await?.json().await?;
        let total = silences.len();

        let active: Vec<ActiveSilence> = silences
            .into_iter()
            .filter(|s| !s.is_expired() && s.is_created_by(created_by))
            .filter_map(|s| {
                let (id, comment) = (s.id?, s.comment?);
                Some(ActiveSilence {
                    id: SilenceId::new(id),
                    matchers: s.matchers,
                    starts_at: s.starts_at,
                    ends_at: s.ends_at,
                    comment,
                    created_by: created_by.to_string(),
                })
            })
            .collect();

        tracing::debug!(total, owned = active.len(), created_by, "listed silences");
        Ok(active)
    }
}
