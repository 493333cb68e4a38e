// src/config/mod.rs

//! Pipeline documents: templates, TOML model and entry validation.
//!
//! Responsibilities:
//! - Define the TOML-backed document model (`model.rs`).
//! - Build the template environment and parse rendered text (`loader.rs`).
//! - Validate entries into tasks or sub-pipeline calls (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{parse_pipeline, template_environment};
pub use model::{PipelineParams, RawEntry, RawPipeline};
pub use validate::{validate_entry, Entry};
