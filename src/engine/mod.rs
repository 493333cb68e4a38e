// src/engine/mod.rs

//! Top-level run context.
//!
//! The [`Runner`] owns the history for the duration of a run and drives the
//! stream: scope changes go to the session, tasks go through the planner and
//! the executor, and history is persisted after every task that ran.

use crate::pipeline::task::TaskRef;
use crate::types::TaskStatus;

pub mod runner;

pub use runner::Runner;

/// Lifecycle events, in stream order, for reporters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    TaskStart { reference: TaskRef, message: String },
    TaskSkip { reference: TaskRef },
    TaskComplete { reference: TaskRef },
    /// The run aborted; emitted by the top-level caller.
    TaskFatal { error: String },
}

/// Per-task verdicts of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tasks: Vec<(TaskRef, TaskStatus)>,
    /// History records removed by the end-of-run prune.
    pub pruned: usize,
}

impl RunSummary {
    pub fn status_of(&self, reference: &str) -> Option<TaskStatus> {
        self.tasks
            .iter()
            .find(|(r, _)| r == reference)
            .map(|(_, status)| *status)
    }

    pub fn statuses(&self) -> Vec<TaskStatus> {
        self.tasks.iter().map(|(_, status)| *status).collect()
    }

    pub fn ran(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|(_, status)| *status == TaskStatus::Run)
            .map(|(r, _)| r.as_str())
            .collect()
    }
}
