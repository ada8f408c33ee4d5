//! Live delivery to the Datadog CI Visibility intake.

use std::time::Duration;

use async_trait::async_trait;
use civis_shared::{CivisError, DEFAULT_TIMEOUT_SECS, PipelineRequest, PluginConfig, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{info, instrument, warn};
use url::Url;

use crate::Sender;

/// Path of the pipeline intake on every Datadog site.
pub const INTAKE_PATH: &str = "/api/v2/ci/pipeline";

/// Header carrying the API credential.
const API_KEY_HEADER: &str = "DD-API-KEY";

/// User-Agent string for intake requests.
const USER_AGENT: &str = concat!("civis/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// SenderConfig
// ---------------------------------------------------------------------------

/// Where and how to send.
#[derive(Clone)]
pub struct SenderConfig {
    /// Full intake URL.
    pub endpoint: Url,
    /// Datadog API key.
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for SenderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SenderConfig {
    /// Intake on `https://api.<region>.datadoghq.com`.
    pub fn for_region(region: &str, api_key: impl Into<String>) -> Result<Self> {
        let raw = format!("https://api.{region}.datadoghq.com{INTAKE_PATH}");
        let endpoint = Url::parse(&raw)
            .map_err(|e| CivisError::config(format!("invalid region '{region}': {e}")))?;
        Ok(Self::with_endpoint(endpoint, api_key))
    }

    /// Intake at an explicit URL.
    pub fn with_endpoint(endpoint: Url, api_key: impl Into<String>) -> Self {
        Self {
            endpoint,
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from a merged plugin config. An explicit endpoint beats the region.
    pub fn from_plugin(config: &PluginConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| CivisError::config("Datadog API key not set"))?;

        let sender = match (config.endpoint_url()?, &config.region) {
            (Some(endpoint), _) => Self::with_endpoint(endpoint, api_key),
            (None, Some(region)) => Self::for_region(region, api_key)?,
            (None, None) => {
                return Err(CivisError::config("neither region nor endpoint set"));
            }
        };

        Ok(sender.timeout(Duration::from_secs(config.timeout_secs)))
    }
}

// ---------------------------------------------------------------------------
// HttpSender
// ---------------------------------------------------------------------------

/// POSTs pipeline events to the intake endpoint.
pub struct HttpSender {
    config: SenderConfig,
    client: Client,
}

impl HttpSender {
    pub fn new(config: SenderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CivisError::Delivery(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl Sender for HttpSender {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip_all, fields(url = %self.config.endpoint))]
    async fn send(&self, request: &PipelineRequest) -> Result<()> {
        let payload = request.to_json()?;
        info!(%payload, "sending pipeline event");

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, &self.config.api_key)
            .body(payload)
            .send()
            .await
            .map_err(|e| CivisError::Delivery(format!("unable to send data: {e}")))?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to read response body");
                String::new()
            }
        };
        info!(status = status.as_u16(), %body, "intake responded");

        if status.as_u16() >= 300 {
            return Err(CivisError::Delivery(format!(
                "server responded with: {status}"
            )));
        }

        Ok(())
    }
}
