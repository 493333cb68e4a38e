// src/exec/executor.rs

//! Turns classified tasks into effects and lifecycle events.

use tracing::{debug, info};

use crate::engine::RunEvent;
use crate::errors::{Result, StitchesError};
use crate::exec::context::TaskContext;
use crate::exec::registry::TaskRegistry;
use crate::plan::decision::Reason;
use crate::plan::planner::PlannedTask;
use crate::report::Reporter;
use crate::types::TaskStatus;

/// What happened to a task the executor was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    /// The task function returned successfully.
    Ran,
}

#[derive(Debug, Clone, Copy)]
pub struct Executor<'r> {
    registry: &'r TaskRegistry,
}

impl<'r> Executor<'r> {
    pub fn new(registry: &'r TaskRegistry) -> Self {
        Self { registry }
    }

    /// Handle one classified task.
    ///
    /// Emits `TaskStart`, then `TaskSkip` for skipped tasks. A failed
    /// classification aborts with [`StitchesError::DependencyFailure`]; an
    /// error from the task function is returned as
    /// [`StitchesError::TaskExecution`] without being handled here.
    pub fn execute(
        &self,
        planned: &PlannedTask,
        ctx: &mut TaskContext<'_>,
        reporter: &mut dyn Reporter,
    ) -> Result<Outcome> {
        let task = &planned.task;
        reporter.report(&RunEvent::TaskStart {
            reference: task.reference.clone(),
            message: task.message.clone(),
        });

        match planned.status {
            TaskStatus::Skip => {
                debug!(reference = %task.reference, reason = %planned.reason, "skipping task");
                reporter.report(&RunEvent::TaskSkip {
                    reference: task.reference.clone(),
                });
                Ok(Outcome::Skipped)
            }
            TaskStatus::Fail => {
                let resources = match &planned.reason {
                    Reason::UnresolvedDependency(ids) => ids.clone(),
                    other => vec![other.to_string()],
                };
                Err(StitchesError::DependencyFailure {
                    reference: task.reference.clone(),
                    resources,
                })
            }
            TaskStatus::Run => {
                let function = self.registry.resolve(task)?;
                info!(reference = %task.reference, kind = %task.kind, reason = %planned.reason, "running task");
                function
                    .call(&task.params, ctx)
                    .map_err(StitchesError::TaskExecution)?;
                Ok(Outcome::Ran)
            }
        }
    }
}
