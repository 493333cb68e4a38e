// src/plan/mod.rs

//! Staleness planning.
//!
//! - [`decision`] holds the classification rules as pure functions.
//! - [`planner`] applies them to the stream and keeps in-run provenance.
//! - [`history`] is the persisted run-to-run record and its stores.

pub mod decision;
pub mod history;
pub mod planner;

pub use decision::{InputStatus, Reason};
pub use history::{History, HistoryRecord, HistoryStore, JsonHistoryFile, MemoryHistoryStore};
pub use planner::{PlannedTask, Planner};
