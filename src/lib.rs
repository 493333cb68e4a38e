// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod grass;
pub mod logging;
pub mod pipeline;
pub mod plan;
pub mod platform;
pub mod report;
pub mod types;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::loader::{default_state_path, parse_vars, split_pipeline_path};
use crate::config::{template_environment, PipelineParams};
use crate::engine::{RunEvent, Runner};
use crate::exec::TaskRegistry;
use crate::grass::{GrassRuntime, GrassSession};
use crate::pipeline::task::{Params, PipelineEvent};
use crate::pipeline::{Expander, Resource};
use crate::plan::JsonHistoryFile;
use crate::platform::LocalPlatform;
use crate::report::{Reporter, SilentReporter, VerboseReporter};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - template loading and pipeline expansion
/// - the history file
/// - the GRASS session and platform probes
/// - the runner and a console reporter
///
/// A failed run is reported, its captured output is written to a log file,
/// and the returned exit code is non-zero.
pub fn run(args: CliArgs) -> Result<ExitCode> {
    let (root, name) = split_pipeline_path(&args.pipeline)?;
    let templates = template_environment(&root);

    let vars = match &args.vars {
        Some(spec) => parse_vars(spec).map_err(anyhow::Error::msg)?,
        None => Params::new(),
    };
    let params = PipelineParams {
        vars,
        database: args.database.clone(),
        location: args.location.clone(),
        mapset: args.mapset.clone(),
    };

    let events = Expander::new(&templates).expand(&name, params)?;
    info!(pipeline = %name, events = events.len(), "pipeline expanded");

    if args.dry_run {
        print_dry_run(&name, &events);
        return Ok(ExitCode::SUCCESS);
    }

    let root_scope = events
        .first()
        .and_then(PipelineEvent::as_location)
        .cloned()
        .unwrap_or_default();
    let state_path = args
        .state
        .clone()
        .unwrap_or_else(|| default_state_path(&root_scope, &root));
    debug!(state = ?state_path, "using history file");
    let mut store = JsonHistoryFile::new(state_path);

    let gisrc = std::env::temp_dir().join(format!(
        "stitches-{}-{}.gisrc",
        std::process::id(),
        epoch_millis()
    ));
    let runtime = GrassRuntime::discover(gisrc);
    let platform = LocalPlatform::new(runtime.clone());
    let mut session = GrassSession::new(runtime);
    let registry = TaskRegistry::with_builtins();

    let mut reporter: Box<dyn Reporter> = if args.verbose {
        Box::new(VerboseReporter::new())
    } else {
        Box::new(SilentReporter::new())
    };

    let mut runner = Runner::new(
        &platform,
        &registry,
        &templates,
        &mut session,
        &mut store,
        args.overrides(),
    )?;

    match runner.run(events, reporter.as_mut()) {
        Ok(summary) => {
            debug!(pruned = summary.pruned, "history pruned");
            if let Some(path) = &args.log {
                runner.output().write_log(path)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(error = %err, "pipeline run failed");
            reporter.report(&RunEvent::TaskFatal {
                error: err.to_string(),
            });
            let path = args.log.clone().unwrap_or_else(failure_log_path);
            runner.output().write_log(&path)?;
            eprintln!("task output written to {}", path.display());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Timestamped log file in the working directory.
fn failure_log_path() -> PathBuf {
    PathBuf::from(format!("stitches.grass-{}.log", epoch_millis()))
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Print the expanded stream without planning or executing anything.
fn print_dry_run(name: &str, events: &[PipelineEvent]) {
    println!("stitches dry-run: {name}");
    for event in events {
        match event {
            PipelineEvent::Location(scope) => println!("  @ {scope}"),
            PipelineEvent::Task(task) => {
                println!("  - [{}] {}", task.reference, task.kind);
                if !task.message.is_empty() {
                    println!("      message: {}", task.message);
                }
                if !task.inputs.is_empty() {
                    println!("      inputs: {}", join(&task.inputs));
                }
                if !task.outputs.is_empty() {
                    println!("      outputs: {}", join(&task.outputs));
                }
                if !task.removes.is_empty() {
                    println!("      removes: {}", join(&task.removes));
                }
                if task.always {
                    println!("      always: true");
                }
            }
        }
    }

    debug!("dry-run complete (no execution)");
}

fn join(resources: &[Resource]) -> String {
    resources
        .iter()
        .map(|r| r.id().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
