// src/config/model.rs

use serde::Deserialize;

use crate::pipeline::task::Params;

/// A pipeline document as read from its rendered TOML.
///
/// ```toml
/// database = "/srv/grassdata"
/// location = "nz"
/// mapset = "work"
///
/// [[tasks]]
/// task = "grass"
/// message = "Import roads"
/// params = { module = "v.in.ogr", input = "roads.shp", output = "roads" }
/// inputs = ["file/roads.shp"]
/// outputs = ["vector/roads"]
///
/// [[tasks]]
/// pipeline = "rasters.toml"
/// params = { vars = { year = 2020 }, mapset = "rasters" }
/// ```
///
/// Scope keys are optional; unset ones are inherited from the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPipeline {
    #[serde(default, alias = "gisdbase")]
    pub database: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub mapset: Option<String>,

    /// Task and sub-pipeline entries, in execution order.
    #[serde(default)]
    pub tasks: Vec<RawEntry>,
}

/// One `[[tasks]]` entry, before it is known to be a task or a pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
    /// Task kind; present on task entries.
    #[serde(default)]
    pub task: Option<String>,

    /// Template name; present on sub-pipeline entries.
    #[serde(default)]
    pub pipeline: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    /// Function arguments for tasks, [`PipelineParams`] for sub-pipelines.
    #[serde(default)]
    pub params: Option<Params>,

    #[serde(default)]
    pub inputs: Vec<String>,

    #[serde(default)]
    pub outputs: Vec<String>,

    #[serde(default)]
    pub removes: Vec<String>,

    /// Run on every invocation regardless of evidence.
    #[serde(default)]
    pub always: bool,
}

/// `params` of a sub-pipeline entry (and of the root invocation).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineParams {
    /// Template variables, layered over the caller's.
    #[serde(default)]
    pub vars: Params,

    #[serde(default, alias = "gisdbase")]
    pub database: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub mapset: Option<String>,
}
