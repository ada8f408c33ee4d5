//! Candidate-chain resolution.

use std::collections::BTreeMap;

use civis_shared::{CivisError, Result};

use crate::env::Environment;
use crate::registry::{FieldRegistry, FieldSpec};

/// Resolves logical keys against an environment snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r FieldRegistry,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Self { registry }
    }

    /// Resolve one field by key.
    pub fn resolve(&self, key: &str, env: &dyn Environment) -> Result<String> {
        Ok(resolve_spec(self.registry.get(key)?, env))
    }

    /// Resolve every declared field.
    pub fn resolve_all(&self, env: &dyn Environment) -> ResolvedEvent {
        let values = self
            .registry
            .iter()
            .map(|spec| (spec.key.clone(), resolve_spec(spec, env)))
            .collect();
        ResolvedEvent { values }
    }
}

/// First non-empty candidate value, else the field's default.
///
/// An empty candidate name is a placeholder and is never looked up.
pub fn resolve_spec(spec: &FieldSpec, env: &dyn Environment) -> String {
    spec.candidates
        .iter()
        .filter(|name| !name.is_empty())
        .find_map(|name| env.var(name).filter(|value| !value.is_empty()))
        .unwrap_or_else(|| spec.default.clone())
}

// ---------------------------------------------------------------------------
// ResolvedEvent
// ---------------------------------------------------------------------------

/// Resolved value for every field of a registry.
///
/// An empty string is a resolved value, not an absence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEvent {
    values: BTreeMap<String, String>,
}

impl ResolvedEvent {
    /// Value for `key`, or `UnknownFieldKey` if it was never resolved.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CivisError::unknown_key(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ResolvedEvent {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
