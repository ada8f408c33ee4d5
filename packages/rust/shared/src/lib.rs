//! Shared types, error model, and configuration for civis.
//!
//! This crate is the foundation depended on by all other civis crates.
//! It provides:
//! - [`CivisError`], the unified error type
//! - Wire types ([`PipelineRequest`], [`PipelineResource`], [`GitInfo`], [`NodeInfo`])
//! - Configuration ([`AppConfig`], [`PluginConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ConfigOverrides, DEFAULT_TIMEOUT_SECS, DeliveryConfig, PluginConfig,
    VisibilityType, load_config, load_config_from,
};
pub use error::{CivisError, Result};
pub use types::{
    GitInfo, NodeInfo, PIPELINE_REQUEST_TYPE, PipelineAttributes, PipelineData, PipelineRequest,
    PipelineResource,
};
