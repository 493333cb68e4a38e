// src/pipeline/mod.rs

//! Pipeline model and expansion.
//!
//! - [`resource`] parses `file/...`, `vector/...` and `raster/...` specs.
//! - [`fingerprint`] hashes a task's contributing configuration.
//! - [`task`] defines task descriptors, scopes and stream events.
//! - [`expand`] turns a nested, templated pipeline into a flat stream.

pub mod expand;
pub mod fingerprint;
pub mod resource;
pub mod task;

pub use expand::Expander;
pub use fingerprint::Fingerprint;
pub use resource::{Locator, MapKind, MapName, Resource, ResourceError};
pub use task::{Params, PipelineEvent, Scope, TaskDescriptor, TaskRef};
