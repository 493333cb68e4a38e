// src/exec/builtins.rs

//! Built-in task kinds.
//!
//! - `script`: run a program; `cmd` is the argument vector.
//! - `grass`: run a GRASS module; `module` names it and every other
//!   parameter becomes a module argument.

use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::exec::context::TaskContext;
use crate::pipeline::task::Params;

pub const SCRIPT: &str = "script";
pub const GRASS: &str = "grass";

/// Module flags passed as `--<name>` when true.
const LONG_FLAGS: &[&str] = &["overwrite", "quiet", "verbose", "superquiet"];

/// Run `cmd = ["program", "arg", ...]`.
pub fn script(params: &Params, ctx: &mut TaskContext<'_>) -> Result<()> {
    let argv = match params.get("cmd") {
        Some(Value::Array(items)) => items.iter().map(argument).collect::<Result<Vec<_>>>()?,
        Some(Value::String(line)) => line.split_whitespace().map(str::to_string).collect(),
        Some(other) => bail!("script `cmd` must be a list of arguments, got {other}"),
        None => bail!("script task requires a `cmd` parameter"),
    };
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("script `cmd` is empty"))?;

    let mut cmd = ctx.command(program);
    cmd.args(args);
    run_captured(cmd, program, ctx)
}

/// Run `module` with the remaining parameters as `key=value` arguments.
pub fn grass(params: &Params, ctx: &mut TaskContext<'_>) -> Result<()> {
    let module = match params.get("module") {
        Some(Value::String(module)) if !module.is_empty() => module.clone(),
        _ => bail!("grass task requires a `module` parameter"),
    };

    let args = module_arguments(params)?;
    let mut cmd = ctx.command(&module);
    cmd.args(&args);
    run_captured(cmd, &module, ctx)
}

/// Translate module parameters into command-line arguments.
fn module_arguments(params: &Params) -> Result<Vec<String>> {
    let mut args = Vec::new();

    for (key, value) in params {
        if key == "module" {
            continue;
        }

        match (key.as_str(), value) {
            ("flags", Value::String(flags)) => {
                if !flags.is_empty() {
                    args.push(format!("-{flags}"));
                }
            }
            (flag, Value::Bool(enabled)) if LONG_FLAGS.contains(&flag) => {
                if *enabled {
                    args.push(format!("--{flag}"));
                }
            }
            (_, Value::Null) => {}
            (_, Value::Array(items)) => {
                let joined = items.iter().map(argument).collect::<Result<Vec<_>>>()?;
                args.push(format!("{key}={}", joined.join(",")));
            }
            (_, other) => args.push(format!("{key}={}", argument(other)?)),
        }
    }

    Ok(args)
}

fn argument(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => bail!("unsupported argument value {other}"),
    }
}

fn run_captured(mut cmd: Command, program: &str, ctx: &mut TaskContext<'_>) -> Result<()> {
    info!(reference = %ctx.reference(), program = %program, "starting task process");

    let output = cmd
        .output()
        .with_context(|| format!("spawning process `{program}` for task {}", ctx.reference()))?;

    ctx.stdout().extend_from_slice(&output.stdout);
    ctx.stderr().extend_from_slice(&output.stderr);

    let code = output.status.code().unwrap_or(-1);
    debug!(
        reference = %ctx.reference(),
        exit_code = code,
        success = output.status.success(),
        "task process exited"
    );

    if !output.status.success() {
        bail!("`{program}` exited with status {code}");
    }
    Ok(())
}
