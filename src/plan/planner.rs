// src/plan/planner.rs

//! Single-pass staleness engine.
//!
//! The planner sees tasks one at a time, in stream order, right before they
//! would execute. That ordering matters: store entries produced by earlier
//! tasks exist by the time later tasks are classified, and the in-run
//! provenance reflects every earlier verdict.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::pipeline::fingerprint::Fingerprint;
use crate::pipeline::resource::Resource;
use crate::pipeline::task::TaskDescriptor;
use crate::plan::decision::{
    aggregate_inputs, input_status, output_exists, override_decision, Provenance, Reason,
};
use crate::plan::history::{History, HistoryRecord};
use crate::platform::Platform;
use crate::types::{RunOverrides, TaskStatus};

/// A task together with its verdict.
#[derive(Debug, Clone)]
pub struct PlannedTask {
    pub task: TaskDescriptor,
    pub status: TaskStatus,
    pub reason: Reason,
    /// Environment fingerprint observed when the task was classified.
    pub environment: String,
}

pub struct Planner<'a> {
    platform: &'a dyn Platform,
    overrides: RunOverrides,
    provenance: Provenance,
    seen: HashSet<Fingerprint>,
}

impl<'a> Planner<'a> {
    pub fn new(platform: &'a dyn Platform, overrides: RunOverrides) -> Self {
        Self {
            platform,
            overrides,
            provenance: Provenance::default(),
            seen: HashSet::new(),
        }
    }

    /// Classify the next task of the stream.
    pub fn classify(&mut self, task: TaskDescriptor, history: &History) -> Result<PlannedTask> {
        let environment = self.platform.environment_fingerprint()?;

        let reason = match override_decision(&self.overrides, &task) {
            Some(reason) => reason,
            None => self.evaluate(&task, history, &environment)?,
        };
        let status = reason.status();

        self.seen.insert(task.fingerprint.clone());
        self.provenance.record(&task, status);

        info!(
            reference = %task.reference,
            kind = %task.kind,
            %status,
            %reason,
            "classified task"
        );

        Ok(PlannedTask {
            task,
            status,
            reason,
            environment,
        })
    }

    fn evaluate(
        &self,
        task: &TaskDescriptor,
        history: &History,
        environment: &str,
    ) -> Result<Reason> {
        let mut missing = Vec::new();
        for output in &task.outputs {
            if !output_exists(self.platform, output)? {
                missing.push(output.id().to_string());
            }
        }
        if !missing.is_empty() {
            return Ok(Reason::MissingOutput(missing));
        }

        let Some(record) = history.get(&task.fingerprint) else {
            return Ok(Reason::UnseenConfiguration);
        };

        if record.region != environment {
            debug!(
                reference = %task.reference,
                previous = %record.region,
                current = %environment,
                "environment fingerprint differs"
            );
            return Ok(Reason::EnvironmentChanged);
        }

        let statuses = task
            .inputs
            .iter()
            .map(|input| {
                input_status(self.platform, record, &self.provenance, input)
                    .map(|status| (input, status))
            })
            .collect::<anyhow::Result<Vec<(&Resource, _)>>>()?;

        Ok(aggregate_inputs(statuses))
    }

    /// Record a task that has just run.
    ///
    /// Overwrites its history with the environment it was classified under,
    /// its message, and the current mtime of every file input. Store inputs
    /// are not recorded; their freshness comes from provenance.
    pub fn record(&self, planned: &PlannedTask, history: &mut History) {
        let task = &planned.task;
        let mut record = HistoryRecord::new(planned.environment.clone(), task.message.clone());

        for input in &task.inputs {
            let Some(path) = input.file_path() else {
                continue;
            };
            match self.platform.file_mtime(path) {
                Ok(mtime) => {
                    record.inputs.insert(input.id().to_string(), mtime);
                }
                Err(e) => warn!(
                    reference = %task.reference,
                    input = %input,
                    error = %e,
                    "input vanished while the task ran; not recorded"
                ),
            }
        }

        debug!(reference = %task.reference, fingerprint = %task.fingerprint, "recorded history");
        history.insert(task.fingerprint.clone(), record);
    }

    /// Whether `fingerprint` was reached during this run.
    pub fn has_seen(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    /// End of run: drop history for every fingerprint not reached.
    pub fn finish(self, history: &mut History) -> usize {
        history.retain_seen(&self.seen)
    }
}
