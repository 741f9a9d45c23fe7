//! Sink HTTP client implementation

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Result, SinkError};
use crate::types::StateUpdate;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Long-lived client session for the state-store REST API.
///
/// Cheap to clone; clones share the underlying connection pool. The session
/// must support concurrent use, which `reqwest::Client` does.
#[derive(Debug, Clone)]
pub struct SinkClient {
    client: Client,
    base_url: Url,
}

impl SinkClient {
    /// Create an unauthenticated client with default timeouts.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the state-store (e.g., "http://localhost:8123/")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create an unauthenticated client with custom timeouts.
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self { client, base_url })
    }

    /// Create a client that sends a bearer token with every request.
    ///
    /// The token is set as a default `Authorization: Bearer <token>` header.
    pub fn with_bearer_token(base_url: &str, token: &str) -> Result<Self> {
        Self::with_bearer_token_config(base_url, token, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create an authenticated client with custom timeouts.
    pub fn with_bearer_token_config(
        base_url: &str,
        token: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let header_value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| SinkError::ParseError(format!("Invalid auth token: {}", e)))?;
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .default_headers(headers)
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Set the state of one sensor.
    ///
    /// Posts to `/api/states/sensor.<sensor_id>`. The state-store treats this
    /// as an idempotent "set current state", so repeated or reordered calls
    /// are harmless.
    #[instrument(skip(self, update))]
    pub async fn set_sensor_state(&self, sensor_id: &str, update: &StateUpdate) -> Result<()> {
        let url = self
            .base_url
            .join(&format!("/api/states/sensor.{}", sensor_id))?;
        debug!("Posting state update to {}", url);

        let response = self.client.post(url).json(update).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::extract_error(response).await)
        }
    }

    /// Turn a non-success response into a `SinkError`, keeping the body
    /// text when the sink sent one.
    async fn extract_error(response: reqwest::Response) -> SinkError {
        let status = response.status().as_u16();
        let message = match response.text().await {
            Ok(body) if !body.is_empty() => body,
            _ => format!("HTTP {}", status),
        };
        SinkError::server_error(status, message)
    }
}
