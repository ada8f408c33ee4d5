//! Delivery boundary for finished pipeline events.
//!
//! The core hands a [`PipelineRequest`] to a [`Sender`] and only looks at
//! success or failure. Two implementations exist:
//! - [`DryRunSender`] writes the payload to a local sink, no network I/O
//! - [`HttpSender`] POSTs the payload to the Datadog CI Visibility intake

mod dry_run;
mod http;

use async_trait::async_trait;
use civis_shared::{PipelineRequest, PluginConfig, Result};

pub use dry_run::DryRunSender;
pub use http::{HttpSender, INTAKE_PATH, SenderConfig};

/// Something that accepts a finished pipeline event.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Deliver one event. No retries.
    async fn send(&self, request: &PipelineRequest) -> Result<()>;
}

/// How the event leaves the process.
#[derive(Debug, Clone)]
pub enum DeliveryMode {
    /// Write the payload locally instead of sending it.
    DryRun,
    /// Send to the intake endpoint.
    Live(SenderConfig),
}

impl DeliveryMode {
    /// Pick the delivery mode for a merged plugin config.
    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        if config.dry_run {
            return Ok(Self::DryRun);
        }
        config.validate_delivery()?;
        Ok(Self::Live(SenderConfig::from_plugin(config)?))
    }
}

/// Build the sender for a delivery mode. Dry runs write to stdout.
pub fn sender_for(mode: DeliveryMode) -> Result<Box<dyn Sender>> {
    match mode {
        DeliveryMode::DryRun => Ok(Box::new(DryRunSender::new())),
        DeliveryMode::Live(config) => Ok(Box::new(HttpSender::new(config)?)),
    }
}
