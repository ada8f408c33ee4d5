use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use civis_shared::{CivisError, PipelineRequest, Result};
use tracing::info;

use crate::Sender;

/// Writes the exact request body to a sink instead of sending it.
pub struct DryRunSender {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl DryRunSender {
    /// Dry-run sender writing to stdout.
    pub fn new() -> Self {
        Self::with_sink(std::io::stdout())
    }

    /// Dry-run sender writing to an arbitrary sink.
    pub fn with_sink(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
        }
    }
}

impl Default for DryRunSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sender for DryRunSender {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn send(&self, request: &PipelineRequest) -> Result<()> {
        let payload = request.to_json()?;
        info!(bytes = payload.len(), "dry run, logging payload");

        let mut sink = self
            .sink
            .lock()
            .map_err(|_| CivisError::Delivery("dry-run sink lock poisoned".into()))?;
        writeln!(sink, "{payload}")
            .and_then(|()| sink.flush())
            .map_err(|e| CivisError::Delivery(format!("failed to write dry-run payload: {e}")))
    }
}
