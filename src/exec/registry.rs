// src/exec/registry.rs

//! Task-kind name -> callable.
//!
//! Lookup is two-tier: built-in kinds first, then `module:function`
//! references against modules loaded into the registry before the run.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{Result, StitchesError};
use crate::exec::builtins;
use crate::exec::context::TaskContext;
use crate::pipeline::task::{Params, TaskDescriptor};

/// Separator between module and function in an extension task kind.
pub const MODULE_SEPARATOR: char = ':';

/// Contract every task function satisfies: succeed, or return an error.
pub trait TaskFn: Send + Sync {
    fn call(&self, params: &Params, ctx: &mut TaskContext<'_>) -> anyhow::Result<()>;
}

impl<F> TaskFn for F
where
    F: Fn(&Params, &mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync,
{
    fn call(&self, params: &Params, ctx: &mut TaskContext<'_>) -> anyhow::Result<()> {
        self(params, ctx)
    }
}

/// A named set of task functions, addressed as `module:function`.
#[derive(Clone, Default)]
pub struct TaskModule {
    name: String,
    functions: HashMap<String, Arc<dyn TaskFn>>,
}

impl TaskModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_function<F>(mut self, name: &str, function: F) -> Self
    where
        F: Fn(&Params, &mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Arc::new(function));
        self
    }

    pub fn with_task(mut self, name: &str, function: Arc<dyn TaskFn>) -> Self {
        self.functions.insert(name.to_string(), function);
        self
    }
}

impl fmt::Debug for TaskModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskModule")
            .field("name", &self.name)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct TaskRegistry {
    builtins: HashMap<String, Arc<dyn TaskFn>>,
    modules: HashMap<String, TaskModule>,
}

impl TaskRegistry {
    /// An empty registry (no built-ins).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `script` and `grass` built-ins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(builtins::SCRIPT, builtins::script);
        registry.register(builtins::GRASS, builtins::grass);
        registry
    }

    pub fn register<F>(&mut self, kind: &str, function: F)
    where
        F: Fn(&Params, &mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.builtins.insert(kind.to_string(), Arc::new(function));
    }

    pub fn register_task(&mut self, kind: &str, function: Arc<dyn TaskFn>) {
        self.builtins.insert(kind.to_string(), function);
    }

    /// Make `module:function` kinds of this module resolvable.
    pub fn load_module(&mut self, module: TaskModule) {
        debug!(module = %module.name, "loaded task module");
        self.modules.insert(module.name.clone(), module);
    }

    /// Resolve a task's kind to its callable.
    pub fn resolve(&self, task: &TaskDescriptor) -> Result<Arc<dyn TaskFn>> {
        if let Some(function) = self.builtins.get(&task.kind) {
            return Ok(Arc::clone(function));
        }

        task.kind
            .split_once(MODULE_SEPARATOR)
            .and_then(|(module, function)| self.modules.get(module)?.functions.get(function))
            .map(Arc::clone)
            .ok_or_else(|| StitchesError::UnknownTaskKind {
                kind: task.kind.clone(),
                pipeline: task.pipeline.clone(),
                reference: task.reference.clone(),
            })
    }
}

impl fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("builtins", &self.builtins.keys().collect::<Vec<_>>())
            .field("modules", &self.modules.values().collect::<Vec<_>>())
            .finish()
    }
}
