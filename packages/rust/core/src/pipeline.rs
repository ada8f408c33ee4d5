//! End-to-end report: environment → validate → resolve → build → send.

use std::time::Instant;

use civis_sender::Sender;
use civis_shared::{PipelineRequest, Result};
use tracing::{debug, info, instrument};

use crate::builder::build_event;
use crate::env::Environment;
use crate::registry::FieldRegistry;
use crate::resolver::Resolver;
use crate::validator::validate_required;

/// Run one report and return the request handed to `sender`.
///
/// Any error aborts the whole run; there is no partial success.
#[instrument(skip_all, fields(sender = sender.name()))]
pub async fn report_pipeline(
    registry: &FieldRegistry,
    env: &dyn Environment,
    sender: &dyn Sender,
) -> Result<PipelineRequest> {
    let start = Instant::now();

    validate_required(registry, env)?;

    let resolved = Resolver::new(registry).resolve_all(env);
    for (key, value) in resolved.iter() {
        debug!(key, value, "resolved field");
    }

    let request = build_event(&resolved)?;
    let resource = request.resource();
    info!(
        unique_id = %resource.unique_id,
        status = %resource.status,
        "pipeline event built"
    );

    sender.send(&request).await?;

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "pipeline event delivered");
    Ok(request)
}
