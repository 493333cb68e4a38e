// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::pipeline::resource::ResourceError;

#[derive(Error, Debug)]
pub enum StitchesError {
    #[error("malformed resource in task {reference} of pipeline '{pipeline}': {source}")]
    Resource {
        pipeline: String,
        reference: String,
        #[source]
        source: ResourceError,
    },

    #[error("malformed pipeline document '{pipeline}': {source}")]
    Document {
        pipeline: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("pipeline template '{0}' not found")]
    TemplateNotFound(String),

    #[error("rendering pipeline template '{pipeline}': {source}")]
    Template {
        pipeline: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("configuration error in task {reference} of pipeline '{pipeline}': {message}")]
    Config {
        pipeline: String,
        reference: String,
        message: String,
    },

    #[error("pipeline '{0}' includes itself")]
    IncludeCycle(String),

    #[error("task \"{kind}\" not found, in \"{pipeline}\" at \"{reference}\"")]
    UnknownTaskKind {
        kind: String,
        pipeline: String,
        reference: String,
    },

    #[error("task {reference} has unresolved dependencies: {}", resources.join(", "))]
    DependencyFailure {
        reference: String,
        resources: Vec<String>,
    },

    #[error(transparent)]
    TaskExecution(anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, StitchesError>;
