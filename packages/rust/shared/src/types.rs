//! Wire types for the CI Visibility pipeline intake.
//!
//! Struct fields are declared in lexicographic order so the serialized JSON
//! lists keys sorted at every level. Dry-run output and the live request body
//! are the same bytes.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Envelope `type` for a pipeline resource request.
pub const PIPELINE_REQUEST_TYPE: &str = "cipipeline_resource_request";

// ---------------------------------------------------------------------------
// Request envelope
// ---------------------------------------------------------------------------

/// Top-level request body: `{"data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub data: PipelineData,
}

/// `data` object: resource attributes plus the envelope type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineData {
    pub attributes: PipelineAttributes,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `data.attributes` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineAttributes {
    pub resource: PipelineResource,
}

impl PipelineRequest {
    /// Wrap a resource in the request envelope.
    pub fn new(resource: PipelineResource, kind: impl Into<String>) -> Self {
        Self {
            data: PipelineData {
                attributes: PipelineAttributes { resource },
                kind: kind.into(),
            },
        }
    }

    /// The pipeline resource carried by this request.
    pub fn resource(&self) -> &PipelineResource {
        &self.data.attributes.resource
    }

    /// Encode as compact JSON, exactly as it goes over the wire.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// One finished CI pipeline execution.
///
/// Timestamps are RFC 3339 UTC strings, or empty when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResource {
    pub end: String,
    pub git: GitInfo,
    pub is_manual: bool,
    pub level: String,
    pub name: String,
    pub node: NodeInfo,
    pub partial_retry: bool,
    pub start: String,
    /// Always lowercase.
    pub status: String,
    pub unique_id: String,
    pub url: String,
}

/// Commit the pipeline ran against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
    pub author_email: String,
    pub author_name: String,
    pub repository_url: String,
    pub sha: String,
}

/// Host that executed the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub hostname: String,
    pub name: String,
    pub workspace: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> PipelineRequest {
        let resource = PipelineResource {
            end: "2023-11-14T23:13:20Z".into(),
            git: GitInfo {
                author_email: "user@example.com".into(),
                author_name: String::new(),
                repository_url: "https://example.com/repo.git".into(),
                sha: "abcdef".into(),
            },
            is_manual: false,
            level: "pipeline".into(),
            name: "pipe123".into(),
            node: NodeInfo::default(),
            partial_retry: false,
            start: "2023-11-14T22:13:20Z".into(),
            status: "success".into(),
            unique_id: "pipe123".into(),
            url: "https://ci.com/build/123".into(),
        };
        PipelineRequest::new(resource, PIPELINE_REQUEST_TYPE)
    }

    #[test]
    fn request_matches_wire_fixture() {
        let fixture = std::fs::read_to_string(
            "../../../fixtures/json/pipeline-request.fixture.json",
        )
        .expect("read fixture");
        let json = sample_request().to_json().expect("serialize");
        assert_eq!(json, fixture.trim_end());
    }

    #[test]
    fn envelope_type_is_renamed() {
        let value = serde_json::to_value(sample_request()).expect("to_value");
        assert_eq!(value["data"]["type"], PIPELINE_REQUEST_TYPE);
        assert!(value["data"].get("kind").is_none());
        assert_eq!(value["data"]["attributes"]["resource"]["git"]["sha"], "abcdef");
    }

    #[test]
    fn empty_fields_are_emitted() {
        let value = serde_json::to_value(sample_request()).expect("to_value");
        let node = &value["data"]["attributes"]["resource"]["node"];
        assert_eq!(node["hostname"], "");
        assert_eq!(node["name"], "");
        assert_eq!(node["workspace"], "");
    }

    #[test]
    fn fixture_deserializes() {
        let fixture = std::fs::read_to_string(
            "../../../fixtures/json/pipeline-request.fixture.json",
        )
        .expect("read fixture");
        let parsed: PipelineRequest = serde_json::from_str(&fixture).expect("deserialize");
        assert_eq!(parsed, sample_request());
        assert_eq!(parsed.resource().status, "success");
    }
}
