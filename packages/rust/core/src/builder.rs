//! Assembles resolved fields into the wire event.

use civis_shared::{GitInfo, NodeInfo, PipelineRequest, PipelineResource, Result};

use crate::registry::keys;
use crate::resolver::ResolvedEvent;
use crate::timestamp;

/// Trigger value that marks a manually started pipeline.
const MANUAL_TRIGGER: &str = "manual";

/// Build the pipeline request from resolved fields.
///
/// Every field is emitted, empty or not. `status` is lowercased, `is_manual`
/// compares the trigger against `"manual"` exactly, and `partial_retry` is
/// always `false`.
pub fn build_event(resolved: &ResolvedEvent) -> Result<PipelineRequest> {
    let field = |key: &str| resolved.get(key).map(str::to_string);

    let unique_id = field(keys::PIPELINE_UNIQUE_ID)?;

    let resource = PipelineResource {
        end: timestamp::normalize(resolved.get(keys::PIPELINE_END)?),
        git: GitInfo {
            author_email: field(keys::GIT_AUTHOR_EMAIL)?,
            author_name: field(keys::GIT_AUTHOR_NAME)?,
            repository_url: field(keys::GIT_REPOSITORY_URL)?,
            sha: field(keys::GIT_COMMIT_SHA)?,
        },
        is_manual: resolved.get(keys::PIPELINE_IS_MANUAL)? == MANUAL_TRIGGER,
        level: field(keys::PIPELINE_LEVEL)?,
        name: unique_id.clone(),
        node: NodeInfo {
            hostname: field(keys::NODE_HOSTNAME)?,
            name: field(keys::NODE_NAME)?,
            workspace: field(keys::NODE_WORKSPACE)?,
        },
        partial_retry: false,
        start: timestamp::normalize(resolved.get(keys::PIPELINE_START)?),
        status: resolved.get(keys::PIPELINE_STATUS)?.to_lowercase(),
        unique_id,
        url: field(keys::PIPELINE_URL)?,
    };

    Ok(PipelineRequest::new(resource, field(keys::PIPELINE_TYPE)?))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use civis_shared::{CivisError, PIPELINE_REQUEST_TYPE};

    use super::*;
    use crate::registry::FieldRegistry;
    use crate::resolver::Resolver;

    fn resolve(pairs: &[(&str, &str)]) -> ResolvedEvent {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Resolver::new(&FieldRegistry::pipeline_visibility()).resolve_all(&env)
    }

    const FULL: &[(&str, &str)] = &[
        ("PLUGIN_BUILD_STARTED", "1700000000"),
        ("PLUGIN_BUILD_FINISHED", "1700003600"),
        ("PLUGIN_COMMIT_AUTHOR_EMAIL", "user@example.com"),
        ("PLUGIN_REPO_REMOTE", "https://example.com/repo.git"),
        ("PLUGIN_COMMIT_SHA", "abcdef"),
        ("PLUGIN_BUILD_LINK", "https://ci.com/build/123"),
        ("PLUGIN_BUILD_STATUS", "success"),
        ("PLUGIN_PIPELINE_ID", "pipe123"),
    ];

    #[test]
    fn full_environment_builds_expected_event() {
        let request = build_event(&resolve(FULL)).unwrap();
        let resource = request.resource();

        assert_eq!(resource.start, "2023-11-14T22:13:20Z");
        assert_eq!(resource.end, "2023-11-14T23:13:20Z");
        assert!(!resource.is_manual);
        assert!(!resource.partial_retry);
        assert_eq!(resource.level, "pipeline");
        assert_eq!(resource.unique_id, "pipe123");
        assert_eq!(resource.name, "pipe123");
        assert_eq!(resource.git.sha, "abcdef");
        assert_eq!(resource.git.author_name, "");
        assert_eq!(request.data.kind, PIPELINE_REQUEST_TYPE);
    }

    #[test]
    fn matches_wire_fixture() {
        let fixture = std::fs::read_to_string(
            "../../../fixtures/json/pipeline-request.fixture.json",
        )
        .expect("read fixture");
        let json = build_event(&resolve(FULL)).unwrap().to_json().unwrap();
        assert_eq!(json, fixture.trim_end());
    }

    #[test]
    fn status_is_lowercased() {
        let mut pairs = FULL.to_vec();
        pairs.push(("PLUGIN_BUILD_STATUS", "SUCCESS"));
        // Later pairs overwrite earlier ones when collected into the map.
        let request = build_event(&resolve(&pairs)).unwrap();
        assert_eq!(request.resource().status, "success");
    }

    #[test]
    fn manual_trigger_is_exact_match() {
        let mut pairs = FULL.to_vec();
        pairs.push(("DRONE_BUILD_TRIGGER", "manual"));
        assert!(build_event(&resolve(&pairs)).unwrap().resource().is_manual);

        let mut pairs = FULL.to_vec();
        pairs.push(("DRONE_BUILD_TRIGGER", "Manual"));
        assert!(!build_event(&resolve(&pairs)).unwrap().resource().is_manual);

        let mut pairs = FULL.to_vec();
        pairs.push(("PLUGIN_BUILD_TRIGGER", "@hook"));
        pairs.push(("DRONE_BUILD_TRIGGER", "manual"));
        assert!(!build_event(&resolve(&pairs)).unwrap().resource().is_manual);
    }

    #[test]
    fn sentinel_and_garbage_timestamps_are_empty() {
        let mut pairs = FULL.to_vec();
        pairs.push(("PLUGIN_BUILD_STARTED", "0"));
        pairs.push(("PLUGIN_BUILD_FINISHED", "soon"));
        let request = build_event(&resolve(&pairs)).unwrap();
        assert_eq!(request.resource().start, "");
        assert_eq!(request.resource().end, "");
    }

    #[test]
    fn node_fields_share_host_chain() {
        let mut pairs = FULL.to_vec();
        pairs.push(("DRONE_SYSTEM_HOSTNAME", "drone.internal"));
        pairs.push(("HARNESS_WORKSPACE", "/harness"));
        let request = build_event(&resolve(&pairs)).unwrap();
        let node = &request.resource().node;
        assert_eq!(node.hostname, "drone.internal");
        assert_eq!(node.name, "drone.internal");
        assert_eq!(node.workspace, "/harness");
    }

    #[test]
    fn incomplete_resolution_is_unknown_key() {
        let partial: ResolvedEvent = [("pipeline_unique_id".to_string(), "x".to_string())]
            .into_iter()
            .collect();
        assert!(matches!(
            build_event(&partial),
            Err(CivisError::UnknownFieldKey { .. })
        ));
    }
}
