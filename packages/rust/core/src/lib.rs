//! Field resolution, validation, and event construction for civis.
//!
//! This crate turns CI environment variables into a pipeline visibility
//! event and hands it to a [`civis_sender::Sender`] (see [`pipeline::report_pipeline`]).

pub mod builder;
pub mod env;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod timestamp;
pub mod validator;

pub use builder::build_event;
pub use env::{Environment, ProcessEnv};
pub use pipeline::report_pipeline;
pub use registry::{FieldRegistry, FieldSpec, keys};
pub use resolver::{ResolvedEvent, Resolver, resolve_spec};
pub use validator::validate_required;
