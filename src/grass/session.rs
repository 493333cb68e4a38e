// src/grass/session.rs

//! Session collaborator that applies scope changes from the stream.

use std::fmt::Debug;
use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::grass::GrassRuntime;
use crate::pipeline::task::Scope;

/// Receives every scope change of the stream before the following tasks run.
pub trait Session: Debug {
    fn enter(&mut self, scope: &Scope) -> Result<()>;

    /// Variables a task's child processes need to act inside the session.
    fn environment(&self) -> Vec<(std::ffi::OsString, std::ffi::OsString)> {
        Vec::new()
    }
}

/// Session that writes the GRASS rc file for each scope.
///
/// The rc file is removed when the session is dropped.
#[derive(Debug)]
pub struct GrassSession {
    runtime: GrassRuntime,
    active: Option<Scope>,
}

impl GrassSession {
    pub fn new(runtime: GrassRuntime) -> Self {
        Self {
            runtime,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&Scope> {
        self.active.as_ref()
    }
}

impl Session for GrassSession {
    fn enter(&mut self, scope: &Scope) -> Result<()> {
        if self.active.as_ref() == Some(scope) {
            debug!(%scope, "scope unchanged");
            return Ok(());
        }

        let path = self.runtime.gisrc();
        let mut file = fs::File::create(path)
            .with_context(|| format!("creating session file {:?}", path))?;
        if let Some(database) = &scope.database {
            writeln!(file, "GISDBASE: {database}")?;
        }
        if let Some(location) = &scope.location {
            writeln!(file, "LOCATION_NAME: {location}")?;
        }
        if let Some(mapset) = &scope.mapset {
            writeln!(file, "MAPSET: {mapset}")?;
        }
        writeln!(file, "GUI: text")?;

        info!(%scope, "entered scope");
        self.active = Some(scope.clone());
        Ok(())
    }

    fn environment(&self) -> Vec<(std::ffi::OsString, std::ffi::OsString)> {
        self.runtime.environment()
    }
}

impl Drop for GrassSession {
    fn drop(&mut self) {
        if self.active.is_none() {
            return;
        }
        if let Err(e) = fs::remove_file(self.runtime.gisrc()) {
            warn!(error = %e, path = ?self.runtime.gisrc(), "failed to remove session file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_rc_file_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join("gisrc");
        let mut session = GrassSession::new(GrassRuntime::new(None, rc.clone()));

        session
            .enter(&Scope {
                database: Some("/data".into()),
                location: Some("nz".into()),
                mapset: Some("PERMANENT".into()),
            })
            .unwrap();

        let text = fs::read_to_string(&rc).unwrap();
        assert!(text.contains("GISDBASE: /data"));
        assert!(text.contains("LOCATION_NAME: nz"));
        assert!(text.contains("MAPSET: PERMANENT"));

        drop(session);
        assert!(!rc.exists());
    }
}
