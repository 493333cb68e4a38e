// src/platform/mock.rs

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use super::Platform;
use crate::pipeline::resource::{MapKind, MapName};

#[derive(Debug, Default)]
struct MockState {
    files: HashMap<PathBuf, f64>,
    maps: HashSet<(MapKind, String)>,
    environment: String,
}

/// In-memory platform for tests.
///
/// Clones share state, so a test can hand one clone to the planner and keep
/// another to modify files and maps between runs.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, mtime: f64) {
        let mut state = self.state.lock().unwrap();
        state.files.insert(path.as_ref().to_path_buf(), mtime);
    }

    /// Bump a file's mtime by one second (creating it at `1.0` if absent).
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        let mtime = state.files.entry(path.as_ref().to_path_buf()).or_insert(0.0);
        *mtime += 1.0;
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.files.remove(path.as_ref());
    }

    pub fn add_map(&self, kind: MapKind, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.maps.insert((kind, name.to_string()));
    }

    pub fn remove_map(&self, kind: MapKind, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.maps.remove(&(kind, name.to_string()));
    }

    pub fn set_environment(&self, fingerprint: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.environment = fingerprint.into();
    }
}

impl Platform for MockPlatform {
    fn file_mtime(&self, path: &Path) -> Result<f64> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(path)
            .copied()
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }

    fn file_exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.files.contains_key(path)
    }

    fn map_exists(&self, kind: MapKind, map: &MapName) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.maps.contains(&(kind, map.name.clone())))
    }

    fn environment_fingerprint(&self) -> Result<String> {
        let state = self.state.lock().unwrap();
        Ok(state.environment.clone())
    }
}
