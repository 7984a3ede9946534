//! Rendering engine HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use clipdesk_models::{JobRequest, StyleOverride, VideoMetadata};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::types::{
    HealthResponse, MetadataRequest, MetadataResponse, RerenderRequest, StatusResponse,
};

/// Configuration for the engine client.
#[derive(Debug, Clone)]
pub struct EngineClientConfig {
    /// Base URL of the engine's HTTP API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retries for idempotent calls (health, metadata)
    pub max_retries: u32,
}

impl Default for EngineClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 0,
        }
    }
}

impl EngineClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("ENGINE_HTTP_URL").unwrap_or(defaults.base_url),
            timeout: std::env::var("ENGINE_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: std::env::var("ENGINE_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Request/response operations the session needs from the engine.
#[async_trait]
pub trait EngineApi: Send + Sync {
    /// `GET /`
    async fn health(&self) -> EngineResult<HealthResponse>;

    /// `POST /metadata`
    async fn fetch_metadata(&self, url: &str) -> EngineResult<VideoMetadata>;

    /// `POST /process`. `Ok` means the engine accepted the job.
    async fn submit_job(&self, request: &JobRequest) -> EngineResult<()>;

    /// `POST /cancel`. The reply body is not interpreted.
    async fn cancel_job(&self) -> EngineResult<()>;

    /// `POST /rerender_clip`
    async fn rerender_clip(&self, path: &str, style: &StyleOverride) -> EngineResult<()>;
}

/// HTTP client for the rendering engine.
#[derive(Debug, Clone)]
pub struct EngineClient {
    http: Client,
    config: EngineClientConfig,
}

impl EngineClient {
    /// Create a new engine client.
    pub fn new(config: EngineClientConfig) -> EngineResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(EngineError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> EngineResult<Self> {
        Self::new(EngineClientConfig::from_env())
    }

    pub fn config(&self) -> &EngineClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Decode a 2xx body, or turn anything else into `EngineError::Http`.
    async fn read_json<T: DeserializeOwned>(response: Response) -> EngineResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> EngineResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = EngineResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Engine request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| EngineError::invalid_response("no attempt was made")))
    }
}

#[async_trait]
impl EngineApi for EngineClient {
    async fn health(&self) -> EngineResult<HealthResponse> {
        let url = self.url("/");
        self.with_retry(|| async {
            let response = self.http.get(&url).send().await?;
            Self::read_json::<HealthResponse>(response).await
        })
        .await
    }

    async fn fetch_metadata(&self, source_url: &str) -> EngineResult<VideoMetadata> {
        let url = self.url("/metadata");
        debug!(url = %source_url, "Fetching video metadata");

        let reply: MetadataResponse = self
            .with_retry(|| async {
                let response = self
                    .http
                    .post(&url)
                    .json(&MetadataRequest { url: source_url })
                    .send()
                    .await?;
                Self::read_json(response).await
            })
            .await?;

        reply.into_metadata()
    }

    async fn submit_job(&self, request: &JobRequest) -> EngineResult<()> {
        let url = self.url("/process");
        info!(url = %request.source_url, resolution = %request.output_resolution, "Submitting job");

        let response = self.http.post(&url).json(request).send().await?;
        let reply: StatusResponse = Self::read_json(response).await?;
        let status = reply.into_result()?;
        debug!(status = %status, "Job accepted");
        Ok(())
    }

    async fn cancel_job(&self) -> EngineResult<()> {
        let url = self.url("/cancel");
        info!("Requesting job cancellation");

        let response = self.http.post(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn rerender_clip(&self, path: &str, style: &StyleOverride) -> EngineResult<()> {
        let url = self.url("/rerender_clip");
        info!(path = %path, "Requesting clip re-render");

        let response = self
            .http
            .post(&url)
            .json(&RerenderRequest {
                path,
                custom_config: style,
            })
            .send()
            .await?;

        // Older engines answer with an empty 200.
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(EngineError::Http {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        if bytes.is_empty() {
            return Ok(());
        }
        let reply: StatusResponse = serde_json::from_slice(&bytes)?;
        reply.into_result().map(|_| ())
    }
}
