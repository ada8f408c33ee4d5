//! Required-field gate.

use civis_shared::{CivisError, Result};
use tracing::debug;

use crate::env::Environment;
use crate::registry::FieldRegistry;
use crate::resolver::resolve_spec;

/// Check that every required field resolves to a non-empty value.
///
/// All required fields are scanned before failing. The error lists every
/// candidate name of every empty field, in registry order.
pub fn validate_required(registry: &FieldRegistry, env: &dyn Environment) -> Result<()> {
    let mut missing = Vec::new();

    for spec in registry.required() {
        if resolve_spec(spec, env).is_empty() {
            debug!(key = %spec.key, "required field is empty");
            missing.extend(spec.candidates.iter().cloned());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CivisError::MissingRequiredFields { names: missing })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::registry::FieldSpec;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env(&[
            ("PLUGIN_BUILD_STARTED", "1700000000"),
            ("PLUGIN_BUILD_FINISHED", "1700003600"),
            ("PLUGIN_COMMIT_AUTHOR_EMAIL", "user@example.com"),
            ("PLUGIN_REPO_REMOTE", "https://example.com/repo.git"),
            ("PLUGIN_COMMIT_SHA", "abcdef"),
            ("PLUGIN_BUILD_LINK", "https://ci.com/build/123"),
            ("PLUGIN_BUILD_STATUS", "success"),
            ("PLUGIN_PIPELINE_ID", "pipe123"),
        ])
    }

    fn missing_names(result: Result<()>) -> Vec<String> {
        match result {
            Err(CivisError::MissingRequiredFields { names }) => names,
            other => panic!("expected MissingRequiredFields, got {other:?}"),
        }
    }

    #[test]
    fn full_environment_passes() {
        let registry = FieldRegistry::pipeline_visibility();
        assert!(validate_required(&registry, &full_env()).is_ok());
    }

    #[test]
    fn drone_variables_satisfy_requirements() {
        let registry = FieldRegistry::pipeline_visibility();
        let drone = env(&[
            ("DRONE_BUILD_STARTED", "1700000000"),
            ("DRONE_BUILD_FINISHED", "1700003600"),
            ("DRONE_COMMIT_AUTHOR_EMAIL", "user@example.com"),
            ("DRONE_GIT_HTTP_URL", "https://example.com/repo.git"),
            ("DRONE_COMMIT_SHA", "abcdef"),
            ("DRONE_BUILD_LINK", "https://drone.example.com/1"),
            ("DRONE_BUILD_STATUS", "failure"),
            ("HARNESS_PIPELINE_ID", "pipe123"),
        ]);
        assert!(validate_required(&registry, &drone).is_ok());
    }

    #[test]
    fn one_missing_field_lists_all_its_candidates() {
        let registry = FieldRegistry::pipeline_visibility();
        let mut env = full_env();
        env.remove("PLUGIN_COMMIT_SHA");

        let names = missing_names(validate_required(&registry, &env));
        assert_eq!(names, ["PLUGIN_COMMIT_SHA", "DRONE_COMMIT_SHA", "CI_COMMIT_SHA"]);
    }

    #[test]
    fn every_missing_field_is_reported() {
        let registry = FieldRegistry::pipeline_visibility();
        let names = missing_names(validate_required(&registry, &env(&[])));

        // Eight required fields have no default; three candidates each except the id.
        assert_eq!(names.len(), 7 * 3 + 2);
        assert_eq!(&names[..3], ["PLUGIN_BUILD_FINISHED", "DRONE_BUILD_FINISHED", "CI_BUILD_FINISHED"]);
        assert!(names.contains(&"HARNESS_PIPELINE_ID".to_string()));
        assert!(names.contains(&"CI_BUILD_STATUS".to_string()));
        // The level has a default and never goes missing.
        assert!(!names.contains(&String::new()));
    }

    #[test]
    fn aggregated_message() {
        let registry = FieldRegistry::from_specs(vec![
            FieldSpec::required("a", &["A1", "A2"]),
            FieldSpec::optional("b", &["B1"]),
            FieldSpec::required("c", &["C1"]),
        ])
        .unwrap();

        let err = validate_required(&registry, &env(&[])).unwrap_err();
        assert_eq!(err.to_string(), "missing required env vars: A1, A2, C1");
    }

    #[test]
    fn required_field_with_empty_default_and_no_candidates_set() {
        let registry = FieldRegistry::from_specs(vec![FieldSpec::required(
            "sha",
            &["PLUGIN_COMMIT_SHA", "DRONE_COMMIT_SHA"],
        )])
        .unwrap();
        let names = missing_names(validate_required(&registry, &env(&[("OTHER", "1")])));
        assert_eq!(names, ["PLUGIN_COMMIT_SHA", "DRONE_COMMIT_SHA"]);
    }
}
