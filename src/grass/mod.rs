// src/grass/mod.rs

//! Adapter for the GRASS GIS runtime.
//!
//! Only the pieces the runner needs: locating the installation, building
//! module commands that see the current session, and keeping the session
//! rc file in step with the pipeline's scope changes ([`session`]).

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

pub mod session;

pub use session::{GrassSession, Session};

/// Environment variable naming the GRASS launcher binary.
pub const GRASSBIN_ENV: &str = "GRASSBIN";

/// Installation and session paths shared by the platform probes, the session
/// and the `grass` task kind.
#[derive(Debug, Clone)]
pub struct GrassRuntime {
    gisbase: Option<PathBuf>,
    gisrc: PathBuf,
}

impl GrassRuntime {
    pub fn new(gisbase: Option<PathBuf>, gisrc: PathBuf) -> Self {
        Self { gisbase, gisrc }
    }

    /// Locate the installation: `GISBASE` if set, otherwise ask the launcher
    /// (`$GRASSBIN`, default `grass`) for its install path.
    pub fn discover(gisrc: PathBuf) -> Self {
        let gisbase = env::var_os("GISBASE")
            .map(PathBuf::from)
            .or_else(query_install_dir);

        match &gisbase {
            Some(path) => debug!(gisbase = ?path, "using GRASS installation"),
            None => warn!("no GRASS installation found; store queries will fail"),
        }

        Self::new(gisbase, gisrc)
    }

    pub fn gisbase(&self) -> Option<&Path> {
        self.gisbase.as_deref()
    }

    /// Path of the session rc file (`GISRC`).
    pub fn gisrc(&self) -> &Path {
        &self.gisrc
    }

    /// Environment variables a process needs to act inside the session.
    pub fn environment(&self) -> Vec<(OsString, OsString)> {
        let mut vars = vec![
            (OsString::from("GISRC"), self.gisrc.clone().into_os_string()),
            (OsString::from("GRASS_MESSAGE_FORMAT"), OsString::from("plain")),
        ];

        if let Some(gisbase) = &self.gisbase {
            vars.push((OsString::from("GISBASE"), gisbase.clone().into_os_string()));

            let mut paths = vec![gisbase.join("bin"), gisbase.join("scripts")];
            if let Some(existing) = env::var_os("PATH") {
                paths.extend(env::split_paths(&existing));
            }
            match env::join_paths(paths) {
                Ok(joined) => vars.push((OsString::from("PATH"), joined)),
                Err(e) => warn!(error = %e, "could not extend PATH with GRASS directories"),
            }
        }

        vars
    }

    /// A command for `program` with the session environment applied.
    pub fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.envs(self.environment());
        cmd
    }
}

fn query_install_dir() -> Option<PathBuf> {
    let grassbin = env::var(GRASSBIN_ENV).unwrap_or_else(|_| "grass".to_string());
    let output = Command::new(&grassbin)
        .args(["--config", "path"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!path.is_empty()).then(|| PathBuf::from(path))
}
