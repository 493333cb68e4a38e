use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pipeline::task::TaskRef;

/// Planner verdict for a task, assigned once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Run,
    Skip,
    Fail,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::Run => "run",
            TaskStatus::Skip => "skip",
            TaskStatus::Fail => "fail",
        })
    }
}

/// Run-time overrides from the command line.
///
/// - `force`: run every task.
/// - `only`: run exactly the task with this reference, skip the rest.
/// - `skip`: skip the listed references.
///
/// All three take precedence over a task's `always` flag.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub force: bool,
    pub skip: BTreeSet<TaskRef>,
    pub only: Option<TaskRef>,
}

impl RunOverrides {
    pub fn force() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    pub fn only(reference: impl Into<TaskRef>) -> Self {
        Self {
            only: Some(reference.into()),
            ..Self::default()
        }
    }

    pub fn skip<I, S>(references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskRef>,
    {
        Self {
            skip: references.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}
