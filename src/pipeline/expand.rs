// src/pipeline/expand.rs

//! Flatten a templated, nested pipeline into one ordered event stream.
//!
//! Traversal is pre-order: a sub-pipeline is fully expanded before the next
//! sibling entry. Every pipeline announces its resolved scope on entry, and
//! the caller's scope is announced again once a sub-pipeline's subtree is
//! done, so consumers can treat the stream as a plain sequence of scope
//! switches and tasks.

use minijinja::{Environment, ErrorKind};
use tracing::{debug, info};

use crate::config::loader::parse_pipeline;
use crate::config::model::PipelineParams;
use crate::config::validate::{validate_entry, Entry};
use crate::errors::{Result, StitchesError};
use crate::pipeline::task::{Params, PipelineEvent, Scope};

/// Mapset used by the root pipeline when nothing else names one.
pub const DEFAULT_MAPSET: &str = "PERMANENT";

/// Expands pipeline templates found in a template environment.
pub struct Expander<'env, 'source> {
    templates: &'env Environment<'source>,
    /// Templates on the current include path, root first.
    active: Vec<String>,
}

impl<'env, 'source> Expander<'env, 'source> {
    pub fn new(templates: &'env Environment<'source>) -> Self {
        Self {
            templates,
            active: Vec::new(),
        }
    }

    /// Expand the root pipeline `name` into a flat event stream.
    ///
    /// The first event is always the root scope; its mapset defaults to
    /// [`DEFAULT_MAPSET`].
    pub fn expand(&mut self, name: &str, params: PipelineParams) -> Result<Vec<PipelineEvent>> {
        let base = Scope {
            mapset: Some(DEFAULT_MAPSET.to_string()),
            ..Scope::default()
        };

        self.active.clear();
        let mut events = Vec::new();
        self.expand_pipeline(name, None, &base, &Params::new(), params, &mut events)?;

        let tasks = events.iter().filter(|e| e.as_task().is_some()).count();
        info!(pipeline = %name, tasks, events = events.len(), "expanded pipeline");
        Ok(events)
    }

    fn expand_pipeline(
        &mut self,
        name: &str,
        prefix: Option<&str>,
        inherited: &Scope,
        inherited_vars: &Params,
        params: PipelineParams,
        out: &mut Vec<PipelineEvent>,
    ) -> Result<()> {
        if self.active.iter().any(|active| active == name) {
            return Err(StitchesError::IncludeCycle(name.to_string()));
        }
        self.active.push(name.to_string());

        let mut vars = inherited_vars.clone();
        vars.extend(params.vars);

        let call_scope = Scope {
            database: params.database,
            location: params.location,
            mapset: params.mapset,
        }
        .inherit(inherited);

        let text = self.render(name, &vars)?;
        let document = parse_pipeline(name, &text)?;

        let scope = Scope {
            database: document.database,
            location: document.location,
            mapset: document.mapset,
        }
        .inherit(&call_scope);

        debug!(pipeline = %name, %scope, "entering pipeline scope");
        out.push(PipelineEvent::Location(scope.clone()));

        for (i, raw) in document.tasks.into_iter().enumerate() {
            let reference = match prefix {
                None => i.to_string(),
                Some(p) => format!("{p}/{i}"),
            };

            match validate_entry(raw, name, &reference)? {
                Entry::Task(task) => {
                    debug!(
                        reference = %task.reference,
                        kind = %task.kind,
                        fingerprint = %task.fingerprint,
                        "expanded task"
                    );
                    out.push(PipelineEvent::Task(task));
                }
                Entry::Pipeline {
                    name: child,
                    params: child_params,
                } => {
                    self.expand_pipeline(&child, Some(&reference), &scope, &vars, child_params, out)?;
                    debug!(pipeline = %name, %scope, "restoring pipeline scope");
                    out.push(PipelineEvent::Location(scope.clone()));
                }
            }
        }

        self.active.pop();
        Ok(())
    }

    fn render(&self, name: &str, vars: &Params) -> Result<String> {
        let template = self.templates.get_template(name).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                StitchesError::TemplateNotFound(name.to_string())
            } else {
                StitchesError::Template {
                    pipeline: name.to_string(),
                    source: e,
                }
            }
        })?;

        template.render(vars).map_err(|source| StitchesError::Template {
            pipeline: name.to_string(),
            source,
        })
    }
}
