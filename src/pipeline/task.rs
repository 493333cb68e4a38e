// src/pipeline/task.rs

//! Task descriptors and the events produced by pipeline expansion.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pipeline::fingerprint::Fingerprint;
use crate::pipeline::resource::Resource;

/// Hierarchical, position-derived task identifier (`"0"`, `"1/0"`, ...).
pub type TaskRef = String;

/// Opaque parameter bag handed to a task function.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Scope of the geospatial store: database / location / mapset.
///
/// Unset fields mean "whatever the session currently uses".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub database: Option<String>,
    pub location: Option<String>,
    pub mapset: Option<String>,
}

impl Scope {
    /// Fill unset fields from `parent`.
    pub fn inherit(self, parent: &Scope) -> Scope {
        Scope {
            database: self.database.or_else(|| parent.database.clone()),
            location: self.location.or_else(|| parent.location.clone()),
            mapset: self.mapset.or_else(|| parent.mapset.clone()),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{}/{}/{}",
            part(&self.database),
            part(&self.location),
            part(&self.mapset)
        )
    }
}

/// One step of an expanded pipeline.
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    /// Registered task kind (`script`, `grass`, or `module:function`).
    pub kind: String,
    pub message: String,
    pub params: Params,
    pub inputs: Vec<Resource>,
    pub outputs: Vec<Resource>,
    pub removes: Vec<Resource>,
    pub always: bool,
    /// Template name of the pipeline that declared this task.
    pub pipeline: String,
    pub reference: TaskRef,
    pub fingerprint: Fingerprint,
}

impl TaskDescriptor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        params: Params,
        inputs: Vec<Resource>,
        outputs: Vec<Resource>,
        removes: Vec<Resource>,
        always: bool,
        pipeline: impl Into<String>,
        reference: impl Into<TaskRef>,
    ) -> Self {
        let kind = kind.into();
        let fingerprint = Fingerprint::compute(&kind, &params, &inputs, &outputs, &removes);
        Self {
            kind,
            message: message.into(),
            params,
            inputs,
            outputs,
            removes,
            always,
            pipeline: pipeline.into(),
            reference: reference.into(),
            fingerprint,
        }
    }
}

/// Item of the flat stream produced by the expander.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Switch the store scope before the following tasks run.
    Location(Scope),
    Task(TaskDescriptor),
}

impl PipelineEvent {
    pub fn as_task(&self) -> Option<&TaskDescriptor> {
        match self {
            PipelineEvent::Task(task) => Some(task),
            PipelineEvent::Location(_) => None,
        }
    }

    pub fn as_location(&self) -> Option<&Scope> {
        match self {
            PipelineEvent::Location(scope) => Some(scope),
            PipelineEvent::Task(_) => None,
        }
    }
}
