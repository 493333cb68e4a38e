// src/plan/decision.rs

//! The planner's decision rules as plain functions.
//!
//! Evaluated in this order, first match wins:
//!
//! 1. overrides (`force`, `only`, `skip`), then the task's `always` flag
//! 2. any declared output missing
//! 3. no history for the fingerprint
//! 4. environment fingerprint changed
//! 5. input evidence (file mtimes, producer status for store entries)

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;

use crate::pipeline::resource::{Locator, Resource};
use crate::pipeline::task::{TaskDescriptor, TaskRef};
use crate::plan::history::HistoryRecord;
use crate::platform::Platform;
use crate::types::{RunOverrides, TaskStatus};

/// Why a task got its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Forced,
    Selected,
    NotSelected,
    ExplicitlySkipped,
    Always,
    MissingOutput(Vec<String>),
    UnseenConfiguration,
    EnvironmentChanged,
    UnresolvedDependency(Vec<String>),
    UnknownUpstream(Vec<String>),
    StaleInput(Vec<String>),
    UpToDate,
}

impl Reason {
    pub fn status(&self) -> TaskStatus {
        match self {
            Reason::NotSelected | Reason::ExplicitlySkipped | Reason::UpToDate => TaskStatus::Skip,
            Reason::UnresolvedDependency(_) => TaskStatus::Fail,
            _ => TaskStatus::Run,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Forced => f.write_str("forced"),
            Reason::Selected => f.write_str("selected with --only"),
            Reason::NotSelected => f.write_str("not the selected task"),
            Reason::ExplicitlySkipped => f.write_str("explicitly skipped"),
            Reason::Always => f.write_str("always runs"),
            Reason::MissingOutput(ids) => write!(f, "missing output: {}", ids.join(", ")),
            Reason::UnseenConfiguration => f.write_str("unseen or changed configuration"),
            Reason::EnvironmentChanged => f.write_str("environment changed"),
            Reason::UnresolvedDependency(ids) => {
                write!(f, "unresolved dependency: {}", ids.join(", "))
            }
            Reason::UnknownUpstream(ids) => write!(f, "unknown upstream state: {}", ids.join(", ")),
            Reason::StaleInput(ids) => write!(f, "stale input: {}", ids.join(", ")),
            Reason::UpToDate => f.write_str("up to date"),
        }
    }
}

/// Classification of one input resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStatus {
    Change,
    NoChange,
    /// Store entry exists but no task of this run produced it.
    Unknown,
    /// The resource does not exist.
    Fail,
}

/// In-run provenance: which task last produced each resource, and what
/// every task seen so far was classified as.
#[derive(Debug, Default)]
pub struct Provenance {
    creators: HashMap<String, TaskRef>,
    statuses: HashMap<TaskRef, TaskStatus>,
}

impl Provenance {
    /// Status of the task that produced `id` in this run, if any.
    pub fn producer_status(&self, id: &str) -> Option<TaskStatus> {
        self.creators
            .get(id)
            .and_then(|reference| self.statuses.get(reference))
            .copied()
    }

    pub fn creator_of(&self, id: &str) -> Option<&TaskRef> {
        self.creators.get(id)
    }

    /// Register a classified task: its outputs now name it as their creator
    /// (last writer wins) and resources it removes lose theirs.
    pub fn record(&mut self, task: &TaskDescriptor, status: TaskStatus) {
        self.statuses.insert(task.reference.clone(), status);
        for output in &task.outputs {
            self.creators
                .insert(output.id().to_string(), task.reference.clone());
        }
        for removed in &task.removes {
            self.creators.remove(removed.id());
        }
    }
}

/// Overrides and the `always` flag; `None` means "decide from evidence".
pub fn override_decision(overrides: &RunOverrides, task: &TaskDescriptor) -> Option<Reason> {
    if overrides.force {
        return Some(Reason::Forced);
    }
    if let Some(only) = &overrides.only {
        return Some(if *only == task.reference {
            Reason::Selected
        } else {
            Reason::NotSelected
        });
    }
    if overrides.skip.contains(&task.reference) {
        return Some(Reason::ExplicitlySkipped);
    }
    if task.always {
        return Some(Reason::Always);
    }
    None
}

pub fn output_exists(platform: &dyn Platform, resource: &Resource) -> Result<bool> {
    match resource.locator() {
        Locator::File { path } => Ok(platform.file_exists(path.as_ref())),
        Locator::Map { kind, map } => platform.map_exists(*kind, map),
    }
}

/// Classify one input of a task that has a history record.
pub fn input_status(
    platform: &dyn Platform,
    record: &HistoryRecord,
    provenance: &Provenance,
    resource: &Resource,
) -> Result<InputStatus> {
    match resource.locator() {
        Locator::File { path } => {
            let path: &std::path::Path = path.as_ref();
            if !platform.file_exists(path) {
                return Ok(InputStatus::Fail);
            }
            let Some(previous) = record.inputs.get(resource.id()) else {
                return Ok(InputStatus::Change);
            };
            let current = platform.file_mtime(path)?;
            Ok(if current > *previous {
                InputStatus::Change
            } else {
                InputStatus::NoChange
            })
        }
        Locator::Map { kind, map } => {
            if !platform.map_exists(*kind, map)? {
                return Ok(InputStatus::Fail);
            }
            Ok(match provenance.producer_status(resource.id()) {
                None => InputStatus::Unknown,
                Some(TaskStatus::Skip) => InputStatus::NoChange,
                Some(_) => InputStatus::Change,
            })
        }
    }
}

/// Fold input classifications: any failure fails the task, then unknown
/// provenance runs it, then any change runs it; otherwise it is up to date.
pub fn aggregate_inputs<'a, I>(inputs: I) -> Reason
where
    I: IntoIterator<Item = (&'a Resource, InputStatus)>,
{
    let mut failed = Vec::new();
    let mut unknown = Vec::new();
    let mut changed = Vec::new();

    for (resource, status) in inputs {
        let id = resource.id().to_string();
        match status {
            InputStatus::Fail => failed.push(id),
            InputStatus::Unknown => unknown.push(id),
            InputStatus::Change => changed.push(id),
            InputStatus::NoChange => {}
        }
    }

    if !failed.is_empty() {
        Reason::UnresolvedDependency(failed)
    } else if !unknown.is_empty() {
        Reason::UnknownUpstream(unknown)
    } else if !changed.is_empty() {
        Reason::StaleInput(changed)
    } else {
        Reason::UpToDate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::resource::MapKind;
    use crate::pipeline::task::Params;
    use crate::platform::mock::MockPlatform;

    fn task(reference: &str, always: bool) -> TaskDescriptor {
        TaskDescriptor::new("script", "", Params::new(), vec![], vec![], vec![], always, "p", reference)
    }

    fn res(spec: &str) -> Resource {
        Resource::parse(spec).unwrap()
    }

    #[test]
    fn overrides_take_precedence_over_always() {
        let always = task("1", true);

        assert_eq!(override_decision(&RunOverrides::force(), &always), Some(Reason::Forced));
        assert_eq!(
            override_decision(&RunOverrides::only("0"), &always),
            Some(Reason::NotSelected)
        );
        assert_eq!(
            override_decision(&RunOverrides::only("1"), &always),
            Some(Reason::Selected)
        );
        assert_eq!(
            override_decision(&RunOverrides::skip(["1"]), &always),
            Some(Reason::ExplicitlySkipped)
        );
        assert_eq!(
            override_decision(&RunOverrides::skip(["0"]), &always),
            Some(Reason::Always)
        );
        assert_eq!(override_decision(&RunOverrides::default(), &task("1", false)), None);
    }

    #[test]
    fn file_inputs_compare_mtimes() {
        let platform = MockPlatform::new();
        platform.add_file("a.txt", 5.0);
        let provenance = Provenance::default();
        let input = res("file/a.txt");

        let mut record = HistoryRecord::new("", "");
        assert_eq!(
            input_status(&platform, &record, &provenance, &input).unwrap(),
            InputStatus::Change
        );

        record.inputs.insert("file/a.txt".into(), 5.0);
        assert_eq!(
            input_status(&platform, &record, &provenance, &input).unwrap(),
            InputStatus::NoChange
        );

        platform.touch("a.txt");
        assert_eq!(
            input_status(&platform, &record, &provenance, &input).unwrap(),
            InputStatus::Change
        );

        platform.remove_file("a.txt");
        assert_eq!(
            input_status(&platform, &record, &provenance, &input).unwrap(),
            InputStatus::Fail
        );
    }

    #[test]
    fn map_inputs_follow_their_producer() {
        let platform = MockPlatform::new();
        platform.add_map(MapKind::Vector, "roads");
        let record = HistoryRecord::new("", "");
        let input = res("vector/roads");
        let mut provenance = Provenance::default();

        assert_eq!(
            input_status(&platform, &record, &provenance, &input).unwrap(),
            InputStatus::Unknown
        );

        let mut producer = task("0", false);
        producer.outputs.push(res("vector/roads"));
        provenance.record(&producer, TaskStatus::Skip);
        assert_eq!(
            input_status(&platform, &record, &provenance, &input).unwrap(),
            InputStatus::NoChange
        );

        provenance.record(&producer, TaskStatus::Run);
        assert_eq!(
            input_status(&platform, &record, &provenance, &input).unwrap(),
            InputStatus::Change
        );

        let mut remover = task("1", false);
        remover.removes.push(res("vector/roads"));
        provenance.record(&remover, TaskStatus::Skip);
        assert_eq!(
            input_status(&platform, &record, &provenance, &input).unwrap(),
            InputStatus::Unknown
        );

        platform.remove_map(MapKind::Vector, "roads");
        assert_eq!(
            input_status(&platform, &record, &provenance, &input).unwrap(),
            InputStatus::Fail
        );
    }

    #[test]
    fn aggregation_precedence() {
        let a = res("file/a");
        let b = res("vector/b");
        let c = res("file/c");

        assert_eq!(
            aggregate_inputs(Vec::<(&Resource, InputStatus)>::new()),
            Reason::UpToDate
        );
        assert_eq!(
            aggregate_inputs([(&a, InputStatus::Change), (&b, InputStatus::Unknown)]),
            Reason::UnknownUpstream(vec!["vector/b".into()])
        );
        assert_eq!(
            aggregate_inputs([
                (&a, InputStatus::Change),
                (&b, InputStatus::Unknown),
                (&c, InputStatus::Fail)
            ]),
            Reason::UnresolvedDependency(vec!["file/c".into()])
        );
        assert_eq!(
            aggregate_inputs([(&a, InputStatus::NoChange), (&c, InputStatus::Change)]),
            Reason::StaleInput(vec!["file/c".into()])
        );
    }
}
