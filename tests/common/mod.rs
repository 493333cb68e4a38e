#![allow(dead_code)]

use minijinja::Environment;
use stitches::config::loader::register_filters;
use stitches::config::PipelineParams;
use stitches::engine::{RunEvent, RunSummary, Runner};
use stitches::errors::StitchesError;
use stitches::exec::TaskRegistry;
use stitches::pipeline::{Expander, PipelineEvent};
use stitches::plan::{History, MemoryHistoryStore};
use stitches::platform::mock::MockPlatform;
use stitches::types::RunOverrides;
use stitches_test_utils::recording_task::{failing, Recorder};
use stitches_test_utils::{init_tracing, RecordingSession};

/// Root template name every fixture run starts from.
pub const ROOT: &str = "main.toml";

/// Everything a pipeline run needs, with in-memory collaborators.
///
/// Task kinds registered:
/// - `work`: records the call and applies its `creates` / `deletes` params
/// - `boom`: always fails
pub struct Fixture {
    pub templates: Environment<'static>,
    pub platform: MockPlatform,
    pub store: MemoryHistoryStore,
    pub registry: TaskRegistry,
    pub recorder: Recorder,
    pub session: RecordingSession,
}

pub struct RunResult {
    pub result: Result<RunSummary, StitchesError>,
    pub events: Vec<RunEvent>,
}

impl RunResult {
    pub fn summary(&self) -> &RunSummary {
        match &self.result {
            Ok(summary) => summary,
            Err(e) => panic!("expected a successful run, got: {e:?}"),
        }
    }

    pub fn error(&self) -> &StitchesError {
        match &self.result {
            Ok(summary) => panic!("expected a failed run, got: {summary:?}"),
            Err(e) => e,
        }
    }

    /// References that received a `TaskStart` event.
    pub fn started(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::TaskStart { reference, .. } => Some(reference.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();

        let mut templates = Environment::new();
        register_filters(&mut templates);

        let platform = MockPlatform::new();
        let recorder = Recorder::new(platform.clone());

        let mut registry = TaskRegistry::new();
        registry.register("work", recorder.task());
        registry.register("boom", failing("boom"));

        Self {
            templates,
            platform,
            store: MemoryHistoryStore::new(),
            registry,
            recorder,
            session: RecordingSession::new(),
        }
    }

    /// Add or replace a pipeline template.
    pub fn template(&mut self, name: &str, text: impl Into<String>) -> &mut Self {
        self.templates
            .add_template_owned(name.to_string(), text.into())
            .unwrap();
        self
    }

    pub fn expand(&self) -> Result<Vec<PipelineEvent>, StitchesError> {
        Expander::new(&self.templates).expand(ROOT, PipelineParams::default())
    }

    pub fn run(&mut self) -> RunResult {
        self.run_with(RunOverrides::default())
    }

    pub fn run_with(&mut self, overrides: RunOverrides) -> RunResult {
        self.recorder.clear();
        let events = match self.expand() {
            Ok(events) => events,
            Err(e) => {
                return RunResult {
                    result: Err(e),
                    events: Vec::new(),
                };
            }
        };

        let mut reported: Vec<RunEvent> = Vec::new();
        let result = Runner::new(
            &self.platform,
            &self.registry,
            &self.templates,
            &mut self.session,
            &mut self.store,
            overrides,
        )
        .and_then(|mut runner| runner.run(events, &mut reported));

        RunResult {
            result,
            events: reported,
        }
    }

    /// Last persisted history (empty if nothing was saved yet).
    pub fn history(&self) -> History {
        self.store.saved().cloned().unwrap_or_default()
    }
}
