// src/exec/context.rs

//! What a task function gets besides its parameters.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::Context;

use minijinja::Environment;

use crate::pipeline::task::{Params, Scope};

/// Stdout/stderr collected from every task of a run.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }

    /// Write both buffers to `path`, each under its own section marker.
    pub fn write_log(&self, path: &Path) -> anyhow::Result<()> {
        let mut file =
            fs::File::create(path).with_context(|| format!("creating run log {:?}", path))?;
        file.write_all(b"****STDOUT****\n")?;
        file.write_all(&self.stdout)?;
        file.write_all(b"\n****STDERR****\n")?;
        file.write_all(&self.stderr)?;
        Ok(())
    }
}

/// Execution context for one task invocation.
///
/// The context mutably borrows the run's [`CapturedOutput`] for the duration
/// of the call only; the buffers are back with the runner on every exit path.
pub struct TaskContext<'a> {
    reference: &'a str,
    scope: &'a Scope,
    templates: &'a Environment<'static>,
    environment: &'a [(OsString, OsString)],
    output: &'a mut CapturedOutput,
}

impl<'a> TaskContext<'a> {
    pub fn new(
        reference: &'a str,
        scope: &'a Scope,
        templates: &'a Environment<'static>,
        environment: &'a [(OsString, OsString)],
        output: &'a mut CapturedOutput,
    ) -> Self {
        Self {
            reference,
            scope,
            templates,
            environment,
            output,
        }
    }

    /// Reference path of the running task.
    pub fn reference(&self) -> &str {
        self.reference
    }

    /// Store scope active for this task.
    pub fn scope(&self) -> &Scope {
        self.scope
    }

    pub fn templates(&self) -> &Environment<'static> {
        self.templates
    }

    /// Render a named template with `vars`.
    pub fn render(&self, template: &str, vars: &Params) -> anyhow::Result<String> {
        let tmpl = self.templates.get_template(template)?;
        Ok(tmpl.render(vars)?)
    }

    /// Session variables child processes must see.
    pub fn environment(&self) -> &[(OsString, OsString)] {
        self.environment
    }

    /// A command for `program` with the session environment applied.
    pub fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.envs(self.environment.iter().map(|(k, v)| (k, v)));
        cmd
    }

    pub fn stdout(&mut self) -> &mut Vec<u8> {
        &mut self.output.stdout
    }

    pub fn stderr(&mut self) -> &mut Vec<u8> {
        &mut self.output.stderr
    }
}
