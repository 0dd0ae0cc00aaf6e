//! HTTP ordering-service client.
//!
//! Posts transactions to the configured gateway endpoint as JSON and maps
//! transport failures and non-success responses into [`SubstrateError`].
//! Request timeouts are enforced by the caller; the underlying reqwest
//! client carries the same bound as a backstop.

use crate::{CommitAck, CommitClient, CommitRef, CommitRequest, HealthStatus, SubstrateError, SubstrateResult};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tracelink_config::SubstrateConfig;
use tracing::{debug, warn};
use url::Url;

/// Client for a remote commit/ordering service
pub struct HttpCommitClient {
    base_url: Url,
    channel: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    block_number: u64,
    committed_at: chrono::DateTime<chrono::Utc>,
}

impl HttpCommitClient {
    /// Creates a client from configuration
    pub fn new(config: &SubstrateConfig) -> SubstrateResult<Self> {
        let base_url = Url::parse(&config.endpoint)
            .map_err(|e| SubstrateError::Transport(format!("invalid endpoint: {}", e)))?;

        let mut builder = reqwest::Client::builder().timeout(config.request_timeout());

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            let credentials = general_purpose::STANDARD.encode(format!("{}:{}", user, pass));
            let mut headers = reqwest::header::HeaderMap::new();
            let mut value = reqwest::header::HeaderValue::from_str(&format!("Basic {}", credentials))
                .map_err(|e| SubstrateError::Transport(format!("invalid credentials: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        Ok(Self {
            base_url,
            channel: config.channel.clone(),
            http_client: builder.build()?,
        })
    }

    fn endpoint(&self, path: &str) -> SubstrateResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| SubstrateError::Transport(format!("invalid request path {}: {}", path, e)))
    }
}

#[async_trait]
impl CommitClient for HttpCommitClient {
    async fn submit(&self, request: &CommitRequest) -> SubstrateResult<CommitAck> {
        let url = self.endpoint(&format!("api/v1/channels/{}/transactions", self.channel))?;
        debug!(transaction_id = %request.transaction_id, %url, "submitting to ordering service");

        let response = self
            .http_client
            .post(url)
            .header("X-Transaction-ID", &request.transaction_id)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubstrateError::Rejected(format!(
                "{}: {}",
                status,
                body.trim()
            )));
        }

        let ack: CommitResponse = response.json().await?;
        Ok(CommitAck {
            transaction_id: request.transaction_id.clone(),
            block_number: ack.block_number,
            committed_at: ack.committed_at,
        })
    }

    async fn health(&self) -> HealthStatus {
        let url = match self.endpoint("health") {
            Ok(url) => url,
            Err(e) => return HealthStatus::unhealthy(e.to_string()),
        };

        match self.http_client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                HealthStatus::healthy(format!("ordering service reachable ({})", response.status()))
            }
            Ok(response) => {
                warn!(status = %response.status(), "ordering service degraded");
                HealthStatus::unhealthy(format!("ordering service returned {}", response.status()))
            }
            Err(e) => HealthStatus::unhealthy(format!("ordering service unreachable: {}", e)),
        }
    }

    async fn commit_ref(&self, block_number: u64) -> SubstrateResult<Option<CommitRef>> {
        let url = self.endpoint(&format!(
            "api/v1/channels/{}/blocks/{}",
            self.channel, block_number
        ))?;

        let response = self.http_client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            return Err(SubstrateError::Rejected(format!(
                "block lookup failed: {}",
                status
            )));
        }
        Ok(Some(response.json().await?))
    }

    async fn close(&self) -> SubstrateResult<()> {
        debug!("closing ordering-service client");
        Ok(())
    }
}
