//! Plugin configuration for civis.
//!
//! Settings come from an optional TOML file (`--config` / `PLUGIN_CONFIG`).
//! CLI flags and `PLUGIN_*` environment variables override file values,
//! which override defaults.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CivisError, Result};

/// Default HTTP timeout for the intake request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Config file structs (matching the TOML schema)
// ---------------------------------------------------------------------------

/// Top-level file config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Delivery settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

/// `[delivery]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Datadog site prefix (`us5`, `eu`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Full intake URL, replacing the region-derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// ---------------------------------------------------------------------------
// Visibility type
// ---------------------------------------------------------------------------

/// Kind of CI Visibility event to report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisibilityType {
    #[default]
    Pipeline,
}

impl FromStr for VisibilityType {
    type Err = CivisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pipeline" => Ok(Self::Pipeline),
            other => Err(CivisError::config(format!(
                "unsupported CI visibility type '{other}' (expected 'pipeline')"
            ))),
        }
    }
}

impl std::fmt::Display for VisibilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pipeline => f.write_str("pipeline"),
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime config (merged from file + CLI/env)
// ---------------------------------------------------------------------------

/// Values supplied on the command line or through `PLUGIN_*` variables.
///
/// `None` means "not given"; the file value or default applies.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dry_run: bool,
    pub api_key: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub visibility_type: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully merged plugin configuration for one run.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// Log the payload instead of sending it.
    pub dry_run: bool,
    /// Datadog API key.
    pub api_key: Option<String>,
    /// Datadog site prefix.
    pub region: Option<String>,
    /// Explicit intake URL, as given. Parsed by [`PluginConfig::endpoint_url`].
    pub endpoint: Option<String>,
    /// Kind of event to report.
    pub visibility_type: VisibilityType,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl PluginConfig {
    /// Merge file config with CLI/env overrides.
    ///
    /// Blank strings count as unset, matching how CI systems export
    /// unconfigured plugin settings.
    pub fn resolve(file: &AppConfig, overrides: ConfigOverrides) -> Result<Self> {
        let region = non_blank(overrides.region).or_else(|| non_blank(file.delivery.region.clone()));

        let endpoint =
            non_blank(overrides.endpoint).or_else(|| non_blank(file.delivery.endpoint.clone()));

        let visibility_type = match non_blank(overrides.visibility_type) {
            Some(raw) => raw.parse()?,
            None => VisibilityType::default(),
        };

        Ok(Self {
            dry_run: overrides.dry_run,
            api_key: non_blank(overrides.api_key),
            region,
            endpoint,
            visibility_type,
            timeout_secs: overrides
                .timeout_secs
                .unwrap_or(file.delivery.timeout_secs),
        })
    }

    /// Parsed intake URL, if one was given.
    pub fn endpoint_url(&self) -> Result<Option<Url>> {
        self.endpoint
            .as_deref()
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|e| CivisError::config(format!("invalid endpoint '{raw}': {e}")))
            })
            .transpose()
    }

    /// Check that a live send has everything it needs.
    ///
    /// Dry runs never touch the network, so delivery settings are not checked.
    pub fn validate_delivery(&self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        if self.api_key.is_none() {
            return Err(CivisError::config(
                "Datadog API key not found. Set PLUGIN_API_KEY or pass --api-key.",
            ));
        }
        if self.region.is_none() && self.endpoint.is_none() {
            return Err(CivisError::config(
                "no intake destination. Set PLUGIN_REGION or PLUGIN_ENDPOINT.",
            ));
        }
        self.endpoint_url()?;
        if self.timeout_secs == 0 {
            return Err(CivisError::config(
                "timeout_secs must be at least 1. Set PLUGIN_TIMEOUT_SECS or [delivery] timeout_secs.",
            ));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the file config, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config_from(path),
        None => {
            tracing::debug!("no config file given, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the file config from a specific path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CivisError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        CivisError::config(format!("failed to parse {}: {e}", path.display()))
    })
}
