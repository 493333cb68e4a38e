// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::RunOverrides;

/// Command-line arguments for `stitches`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stitches",
    version,
    about = "Run a templated geoprocessing pipeline, skipping steps that are up to date.",
    long_about = None
)]
pub struct CliArgs {
    /// Root pipeline file (TOML template).
    #[arg(value_name = "PIPELINE")]
    pub pipeline: PathBuf,

    /// Database directory of the root scope.
    #[arg(long, alias = "gisdbase", value_name = "PATH")]
    pub database: Option<String>,

    /// Location of the root scope.
    #[arg(long, value_name = "NAME")]
    pub location: Option<String>,

    /// Mapset of the root scope (default: PERMANENT).
    #[arg(long, value_name = "NAME")]
    pub mapset: Option<String>,

    /// Skip the task with this reference. Repeatable; a value may list
    /// several references separated by commas.
    #[arg(long, value_name = "REF", value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run every task regardless of history.
    #[arg(long)]
    pub force: bool,

    /// Run only the task with this reference.
    #[arg(long, value_name = "REF", conflicts_with_all = ["skip", "force"])]
    pub only: Option<String>,

    /// Template variables for the root pipeline, e.g. `"a=1 b=2"`.
    #[arg(long, value_name = "VARS")]
    pub vars: Option<String>,

    /// Write captured task output to this file.
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// History file to use instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Print every task as it is processed.
    #[arg(long, short)]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STITCHES_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Expand the pipeline and print the task stream without running it.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            force: self.force,
            skip: self
                .skip
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            only: self.only.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
