//! Field table: logical key → candidate environment variables.
//!
//! Built once at startup and passed explicitly to the resolver and validator.

use std::collections::HashMap;

use civis_shared::{CivisError, Result};

/// Logical field keys of the pipeline visibility table.
pub mod keys {
    pub const PIPELINE_END: &str = "pipeline_end";
    pub const PIPELINE_START: &str = "pipeline_start";
    pub const GIT_AUTHOR_EMAIL: &str = "git_author_email";
    pub const GIT_AUTHOR_NAME: &str = "git_author_name";
    pub const GIT_BRANCH: &str = "git_branch";
    pub const GIT_COMMIT_MESSAGE: &str = "git_commit_message";
    pub const GIT_REPOSITORY_URL: &str = "git_repository_url";
    pub const GIT_COMMIT_SHA: &str = "git_commit_sha";
    pub const GIT_TAG: &str = "git_tag";
    pub const PIPELINE_IS_MANUAL: &str = "pipeline_is_manual";
    pub const PIPELINE_LEVEL: &str = "pipeline_level";
    pub const PIPELINE_NAME: &str = "pipeline_name";
    pub const NODE_HOSTNAME: &str = "node_hostname";
    pub const NODE_NAME: &str = "node_name";
    pub const NODE_WORKSPACE: &str = "node_workspace";
    pub const PIPELINE_URL: &str = "pipeline_url";
    pub const PIPELINE_UNIQUE_ID: &str = "pipeline_unique_id";
    pub const PIPELINE_STATUS: &str = "pipeline_status";
    pub const PIPELINE_TYPE: &str = "pipeline_type";
}

// ---------------------------------------------------------------------------
// FieldSpec
// ---------------------------------------------------------------------------

/// How one logical field is sourced from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Logical key, unique within a registry.
    pub key: String,
    /// Variable names in priority order. First non-empty value wins.
    pub candidates: Vec<String>,
    /// Value used when no candidate is set. May be empty.
    pub default: String,
    /// Whether an empty resolution fails validation.
    pub required: bool,
}

impl FieldSpec {
    /// A field that must resolve to a non-empty value.
    pub fn required(key: &str, candidates: &[&str]) -> Self {
        Self::new(key, candidates, true)
    }

    /// A field that may resolve to an empty value.
    pub fn optional(key: &str, candidates: &[&str]) -> Self {
        Self::new(key, candidates, false)
    }

    fn new(key: &str, candidates: &[&str], required: bool) -> Self {
        Self {
            key: key.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            default: String::new(),
            required,
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = default.to_string();
        self
    }
}

// ---------------------------------------------------------------------------
// FieldRegistry
// ---------------------------------------------------------------------------

/// Immutable, ordered set of [`FieldSpec`]s with lookup by key.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    specs: Vec<FieldSpec>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Build a registry, rejecting duplicate keys.
    pub fn from_specs(specs: Vec<FieldSpec>) -> Result<Self> {
        let mut index = HashMap::with_capacity(specs.len());
        for (pos, spec) in specs.iter().enumerate() {
            if index.insert(spec.key.clone(), pos).is_some() {
                return Err(CivisError::config(format!(
                    "duplicate field key '{}' in registry",
                    spec.key
                )));
            }
        }
        Ok(Self { specs, index })
    }

    /// The CI pipeline visibility table for plugin, Drone, Harness and generic CI variables.
    pub fn pipeline_visibility() -> Self {
        use keys::*;

        let specs = vec![
            FieldSpec::required(
                PIPELINE_END,
                &["PLUGIN_BUILD_FINISHED", "DRONE_BUILD_FINISHED", "CI_BUILD_FINISHED"],
            ),
            FieldSpec::required(
                PIPELINE_START,
                &["PLUGIN_BUILD_STARTED", "DRONE_BUILD_STARTED", "CI_BUILD_STARTED"],
            ),
            FieldSpec::required(
                GIT_AUTHOR_EMAIL,
                &[
                    "PLUGIN_COMMIT_AUTHOR_EMAIL",
                    "DRONE_COMMIT_AUTHOR_EMAIL",
                    "CI_COMMIT_AUTHOR_EMAIL",
                ],
            ),
            FieldSpec::optional(
                GIT_AUTHOR_NAME,
                &["PLUGIN_COMMIT_AUTHOR", "DRONE_COMMIT_AUTHOR", "CI_COMMIT_AUTHOR"],
            ),
            FieldSpec::optional(GIT_BRANCH, &["PLUGIN_BRANCH", "DRONE_BRANCH"]),
            FieldSpec::optional(
                GIT_COMMIT_MESSAGE,
                &["PLUGIN_COMMIT_MESSAGE", "DRONE_COMMIT_MESSAGE", "CI_COMMIT_MESSAGE"],
            ),
            FieldSpec::required(
                GIT_REPOSITORY_URL,
                &["PLUGIN_REPO_REMOTE", "DRONE_GIT_HTTP_URL", "CI_REPO_REMOTE"],
            ),
            FieldSpec::required(
                GIT_COMMIT_SHA,
                &["PLUGIN_COMMIT_SHA", "DRONE_COMMIT_SHA", "CI_COMMIT_SHA"],
            ),
            FieldSpec::optional(GIT_TAG, &["PLUGIN_TAG", "DRONE_TAG"]),
            FieldSpec::optional(
                PIPELINE_IS_MANUAL,
                &["PLUGIN_BUILD_TRIGGER", "DRONE_BUILD_TRIGGER"],
            ),
            FieldSpec::required(PIPELINE_LEVEL, &[""]).with_default("pipeline"),
            FieldSpec::optional(PIPELINE_NAME, &["PLUGIN_PIPELINE_ID", "HARNESS_PIPELINE_ID"]),
            FieldSpec::optional(
                NODE_HOSTNAME,
                &["PLUGIN_SYSTEM_HOST", "DRONE_SYSTEM_HOSTNAME", "DRONE_SYSTEM_HOST"],
            ),
            FieldSpec::optional(
                NODE_NAME,
                &["PLUGIN_SYSTEM_HOST", "DRONE_SYSTEM_HOSTNAME", "DRONE_SYSTEM_HOST"],
            ),
            FieldSpec::optional(
                NODE_WORKSPACE,
                &["PLUGIN_WORKSPACE", "DRONE_WORKSPACE", "HARNESS_WORKSPACE"],
            ),
            FieldSpec::required(
                PIPELINE_URL,
                &["PLUGIN_BUILD_LINK", "DRONE_BUILD_LINK", "CI_BUILD_LINK"],
            ),
            FieldSpec::required(
                PIPELINE_UNIQUE_ID,
                &["PLUGIN_PIPELINE_ID", "HARNESS_PIPELINE_ID"],
            ),
            FieldSpec::required(
                PIPELINE_STATUS,
                &["PLUGIN_BUILD_STATUS", "DRONE_BUILD_STATUS", "CI_BUILD_STATUS"],
            ),
            FieldSpec::optional(PIPELINE_TYPE, &[""])
                .with_default(civis_shared::PIPELINE_REQUEST_TYPE),
        ];

        let index = specs
            .iter()
            .enumerate()
            .map(|(pos, spec)| (spec.key.clone(), pos))
            .collect();
        Self { specs, index }
    }

    /// Look up a field by key.
    pub fn get(&self, key: &str) -> Result<&FieldSpec> {
        self.index
            .get(key)
            .map(|&pos| &self.specs[pos])
            .ok_or_else(|| CivisError::unknown_key(key))
    }

    /// All fields in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter()
    }

    /// Required fields in declared order.
    pub fn required(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter().filter(|spec| spec.required)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
