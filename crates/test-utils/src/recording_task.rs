use std::sync::{Arc, Mutex};

use serde_json::Value;
use stitches::exec::TaskContext;
use stitches::pipeline::{Locator, Params, Resource};
use stitches::platform::mock::MockPlatform;

/// Parameter naming resources a [`Recorder`] task materialises on the mock
/// platform when it runs.
pub const CREATES: &str = "creates";

/// Parameter naming resources a [`Recorder`] task deletes from the mock
/// platform when it runs.
pub const DELETES: &str = "deletes";

/// One invocation seen by a recording task.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub reference: String,
    pub params: Params,
}

/// Task functions that:
/// - record every invocation (reference + params)
/// - apply `creates` / `deletes` params to a shared [`MockPlatform`]
/// - write one line of stdout per call
#[derive(Debug, Clone)]
pub struct Recorder {
    platform: MockPlatform,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    pub fn new(platform: MockPlatform) -> Self {
        Self {
            platform,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// References of every call so far, in order.
    pub fn references(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.reference.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// A task function bound to this recorder.
    pub fn task(
        &self,
    ) -> impl Fn(&Params, &mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static {
        let recorder = self.clone();
        move |params: &Params, ctx: &mut TaskContext<'_>| {
            recorder.calls.lock().unwrap().push(Call {
                reference: ctx.reference().to_string(),
                params: params.clone(),
            });
            for spec in resource_list(params, CREATES)? {
                match spec.locator() {
                    Locator::File { path } => recorder.platform.touch(path),
                    Locator::Map { kind, map } => recorder.platform.add_map(*kind, &map.name),
                }
            }
            for spec in resource_list(params, DELETES)? {
                match spec.locator() {
                    Locator::File { path } => recorder.platform.remove_file(path),
                    Locator::Map { kind, map } => recorder.platform.remove_map(*kind, &map.name),
                }
            }
            let line = format!("ran {}\n", ctx.reference());
            ctx.stdout().extend_from_slice(line.as_bytes());
            Ok(())
        }
    }
}

/// A task function that always fails with `message`.
pub fn failing(
    message: &'static str,
) -> impl Fn(&Params, &mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static {
    move |_params: &Params, ctx: &mut TaskContext<'_>| {
        ctx.stderr().extend_from_slice(message.as_bytes());
        Err(anyhow::anyhow!(message))
    }
}

fn resource_list(params: &Params, key: &str) -> anyhow::Result<Vec<Resource>> {
    match params.get(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                let spec = item
                    .as_str()
                    .ok_or_else(|| anyhow::anyhow!("`{key}` entries must be strings"))?;
                Ok(Resource::parse(spec)?)
            })
            .collect(),
        Some(other) => anyhow::bail!("`{key}` must be a list, got {other}"),
    }
}
