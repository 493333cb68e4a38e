// src/engine/runner.rs

use minijinja::Environment;
use tracing::{debug, info};

use crate::engine::{RunEvent, RunSummary};
use crate::errors::Result;
use crate::exec::{CapturedOutput, Executor, Outcome, TaskContext, TaskRegistry};
use crate::grass::Session;
use crate::pipeline::task::{PipelineEvent, Scope};
use crate::plan::{History, HistoryStore, Planner};
use crate::platform::Platform;
use crate::report::Reporter;
use crate::types::RunOverrides;

/// Drives one pipeline run, strictly in stream order.
pub struct Runner<'a> {
    platform: &'a dyn Platform,
    registry: &'a TaskRegistry,
    templates: &'a Environment<'static>,
    session: &'a mut dyn Session,
    store: &'a mut dyn HistoryStore,
    overrides: RunOverrides,
    history: History,
    output: CapturedOutput,
}

impl<'a> Runner<'a> {
    /// Create a runner, loading history from `store`.
    pub fn new(
        platform: &'a dyn Platform,
        registry: &'a TaskRegistry,
        templates: &'a Environment<'static>,
        session: &'a mut dyn Session,
        store: &'a mut dyn HistoryStore,
        overrides: RunOverrides,
    ) -> Result<Self> {
        let history = store.load()?;
        debug!(records = history.len(), "history loaded");
        Ok(Self {
            platform,
            registry,
            templates,
            session,
            store,
            overrides,
            history,
            output: CapturedOutput::new(),
        })
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Task output captured so far (kept after a failed run).
    pub fn output(&self) -> &CapturedOutput {
        &self.output
    }

    /// Run the stream.
    ///
    /// History is saved after each task that ran and once more after the
    /// end-of-run prune. Any error aborts the run before the next task starts;
    /// the prune only happens when the whole stream was processed.
    pub fn run(&mut self, events: Vec<PipelineEvent>, reporter: &mut dyn Reporter) -> Result<RunSummary> {
        let mut planner = Planner::new(self.platform, self.overrides.clone());
        let executor = Executor::new(self.registry);
        let mut scope = Scope::default();
        let mut summary = RunSummary::default();

        for event in events {
            let task = match event {
                PipelineEvent::Location(next) => {
                    self.session.enter(&next)?;
                    scope = next;
                    continue;
                }
                PipelineEvent::Task(task) => task,
            };

            let planned = planner.classify(task, &self.history)?;
            let environment = self.session.environment();
            let reference = planned.task.reference.clone();

            let outcome = {
                let mut ctx = TaskContext::new(
                    &reference,
                    &scope,
                    self.templates,
                    &environment,
                    &mut self.output,
                );
                executor.execute(&planned, &mut ctx, reporter)?
            };
            summary.tasks.push((reference.clone(), planned.status));

            if outcome == Outcome::Ran {
                planner.record(&planned, &mut self.history);
                self.store.save(&self.history)?;
                reporter.report(&RunEvent::TaskComplete { reference });
            }
        }

        summary.pruned = planner.finish(&mut self.history);
        self.store.save(&self.history)?;

        info!(
            tasks = summary.tasks.len(),
            ran = summary.ran().len(),
            pruned = summary.pruned,
            "pipeline run finished"
        );
        Ok(summary)
    }
}
