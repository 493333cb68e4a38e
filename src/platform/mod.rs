// src/platform/mod.rs

//! Platform probes the planner relies on.
//!
//! The planner never touches the filesystem or the geospatial store directly;
//! it goes through a [`Platform`], which makes it testable with
//! [`mock::MockPlatform`].

use std::fmt::Debug;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::grass::GrassRuntime;
use crate::pipeline::resource::{MapKind, MapName};

pub mod mock;

/// Environment fingerprint reported when no store runtime is reachable.
pub const NO_ENVIRONMENT: &str = "unavailable";

/// Abstract access to files, the store, and ambient processing context.
pub trait Platform: Debug {
    /// Modification time in fractional seconds since the Unix epoch.
    fn file_mtime(&self, path: &Path) -> Result<f64>;
    fn file_exists(&self, path: &Path) -> bool;
    /// True if the store has an entry of `kind` with exactly this name.
    fn map_exists(&self, kind: MapKind, map: &MapName) -> Result<bool>;
    /// Deterministic hash of the ambient processing context (region).
    fn environment_fingerprint(&self) -> Result<String>;
}

/// Implementation backed by `std::fs` and the store's command-line tools.
#[derive(Debug, Clone)]
pub struct LocalPlatform {
    runtime: GrassRuntime,
}

impl LocalPlatform {
    pub fn new(runtime: GrassRuntime) -> Self {
        Self { runtime }
    }
}

impl Platform for LocalPlatform {
    fn file_mtime(&self, path: &Path) -> Result<f64> {
        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .with_context(|| format!("reading mtime of {:?}", path))?;
        let since_epoch = modified
            .duration_since(UNIX_EPOCH)
            .with_context(|| format!("mtime of {:?} predates the epoch", path))?;
        Ok(since_epoch.as_secs_f64())
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn map_exists(&self, kind: MapKind, map: &MapName) -> Result<bool> {
        let mut cmd = self.runtime.command("g.list");
        cmd.arg(format!("type={kind}"))
            .arg(format!("pattern={}", map.name));
        if let Some(mapset) = &map.mapset {
            cmd.arg(format!("mapset={mapset}"));
        }

        let output = cmd
            .output()
            .with_context(|| format!("listing {kind} maps named {}", map.name))?;
        if !output.status.success() {
            anyhow::bail!(
                "g.list failed for {kind} {}: {}",
                map.name,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let found = stdout.lines().any(|line| line.trim() == map.name);
        debug!(kind = %kind, name = %map.name, found, "checked map existence");
        Ok(found)
    }

    fn environment_fingerprint(&self) -> Result<String> {
        let output = match self.runtime.command("g.region").arg("-g").output() {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("g.region not available; using constant environment fingerprint");
                return Ok(NO_ENVIRONMENT.to_string());
            }
            Err(e) => return Err(e).context("querying the current region"),
        };

        if !output.status.success() {
            anyhow::bail!(
                "g.region failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let mut hasher = Hasher::new();
        hasher.update(&output.stdout);
        Ok(hasher.finalize().to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_file_probes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let platform = LocalPlatform::new(GrassRuntime::new(None, dir.path().join("rc")));

        assert!(!platform.file_exists(&path));
        assert!(platform.file_mtime(&path).is_err());

        fs::write(&path, "x").unwrap();
        assert!(platform.file_exists(&path));
        assert!(platform.file_mtime(&path).unwrap() > 0.0);
    }
}
