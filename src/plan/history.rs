// src/plan/history.rs

//! Run-to-run history: fingerprint -> last observed inputs and environment.
//!
//! [`History`] is the in-memory map the planner reads and updates.
//! [`HistoryStore`] persists it; [`JsonHistoryFile`] is the on-disk form and
//! [`MemoryHistoryStore`] keeps snapshots in memory for tests.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::Result;
use crate::pipeline::fingerprint::Fingerprint;

/// What was observed the last time a task configuration ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// File input id -> mtime when the task last ran.
    #[serde(default)]
    pub inputs: BTreeMap<String, f64>,
    /// Environment fingerprint the task last ran under.
    #[serde(default)]
    pub region: String,
    /// Task message, for humans reading the file.
    #[serde(default)]
    pub message: String,
}

impl HistoryRecord {
    pub fn new(region: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            inputs: BTreeMap::new(),
            region: region.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    history: BTreeMap<Fingerprint, HistoryRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only lookup; never creates an entry.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&HistoryRecord> {
        self.history.get(fingerprint)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.history.contains_key(fingerprint)
    }

    /// Replace the record for `fingerprint`.
    pub fn insert(&mut self, fingerprint: Fingerprint, record: HistoryRecord) {
        self.history.insert(fingerprint, record);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.history.keys()
    }

    /// Drop every record whose fingerprint is not in `seen`.
    ///
    /// Returns the number of removed records.
    pub fn retain_seen(&mut self, seen: &HashSet<Fingerprint>) -> usize {
        let initial_len = self.history.len();
        self.history.retain(|fp, _| seen.contains(fp));
        let removed = initial_len - self.history.len();
        if removed > 0 {
            info!(removed, "pruned stale history records");
        }
        removed
    }
}

/// Abstract persistence for [`History`].
pub trait HistoryStore {
    fn load(&self) -> Result<History>;
    fn save(&mut self, history: &History) -> Result<()>;
}

/// History kept as pretty JSON: `{"history": {<fingerprint>: {...}}}`.
#[derive(Debug, Clone)]
pub struct JsonHistoryFile {
    path: PathBuf,
}

impl JsonHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryFile {
    /// A missing file is an empty history.
    fn load(&self) -> Result<History> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "no history file; starting empty");
                return Ok(History::new());
            }
            Err(e) => return Err(e.into()),
        };
        let history: History = serde_json::from_str(&text)?;
        debug!(path = ?self.path, records = history.len(), "loaded history");
        Ok(history)
    }

    fn save(&mut self, history: &History) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(history)?;
        fs::write(&self.path, serialized)?;
        debug!(path = ?self.path, records = history.len(), "saved history");
        Ok(())
    }
}

/// In-memory store; remembers the last saved snapshot and the save count.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    saved: Option<History>,
    saves: usize,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing history, as if loaded from disk.
    pub fn with_history(history: History) -> Self {
        Self {
            saved: Some(history),
            saves: 0,
        }
    }

    pub fn saved(&self) -> Option<&History> {
        self.saved.as_ref()
    }

    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<History> {
        Ok(self.saved.clone().unwrap_or_default())
    }

    fn save(&mut self, history: &History) -> Result<()> {
        self.saved = Some(history.clone());
        self.saves += 1;
        Ok(())
    }
}
