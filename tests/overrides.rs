// tests/overrides.rs

mod common;

use common::Fixture;
use stitches::types::{RunOverrides, TaskStatus};
use stitches_test_utils::builders::{EntryBuilder, PipelineBuilder};

fn fixture() -> Fixture {
    let mut fx = Fixture::new();
    fx.template(
        common::ROOT,
        PipelineBuilder::new()
            .with(EntryBuilder::task("work").param("step", "a"))
            .with(EntryBuilder::task("work").param("step", "b").always())
            .with(EntryBuilder::task("work").param("step", "c"))
            .build(),
    );
    fx
}

#[test]
fn always_runs_when_up_to_date() {
    let mut fx = fixture();
    fx.run();

    let rerun = fx.run();
    assert_eq!(
        rerun.summary().statuses(),
        vec![TaskStatus::Skip, TaskStatus::Run, TaskStatus::Skip]
    );
}

#[test]
fn force_runs_everything() {
    let mut fx = fixture();
    fx.run();

    let forced = fx.run_with(RunOverrides::force());
    assert_eq!(forced.summary().statuses(), vec![TaskStatus::Run; 3]);
    assert_eq!(fx.recorder.references(), vec!["0", "1", "2"]);
}

#[test]
fn only_runs_the_selected_task() {
    let mut fx = fixture();

    let selected = fx.run_with(RunOverrides::only("2"));
    assert_eq!(
        selected.summary().statuses(),
        vec![TaskStatus::Skip, TaskStatus::Skip, TaskStatus::Run]
    );
    assert_eq!(fx.recorder.references(), vec!["2"]);
}

#[test]
fn skip_beats_always() {
    let mut fx = fixture();

    let skipped = fx.run_with(RunOverrides::skip(["1", "2"]));
    assert_eq!(
        skipped.summary().statuses(),
        vec![TaskStatus::Run, TaskStatus::Skip, TaskStatus::Skip]
    );
}

#[test]
fn skipped_tasks_keep_their_history() {
    let mut fx = fixture();
    fx.run();
    assert_eq!(fx.history().len(), 3);

    let skipped = fx.run_with(RunOverrides::skip(["0"]));
    assert_eq!(skipped.summary().pruned, 0);
    assert_eq!(fx.history().len(), 3);
}
