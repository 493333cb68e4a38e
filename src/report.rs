// src/report.rs

//! Console reporting of run events.
//!
//! Reporters only observe; they never influence the run. Both console
//! reporters write to stderr so stdout stays free for anything a task prints
//! directly.

use std::io::Write;

use crate::engine::RunEvent;

pub trait Reporter {
    fn report(&mut self, event: &RunEvent);
}

/// Collects events in order. Used by tests and by callers that want to
/// inspect a run after the fact.
impl Reporter for Vec<RunEvent> {
    fn report(&mut self, event: &RunEvent) {
        self.push(event.clone());
    }
}

/// Quiet unless something goes wrong: remembers the current task so a fatal
/// error can be attributed.
#[derive(Debug, Default)]
pub struct SilentReporter {
    current: Option<(String, String)>,
}

impl SilentReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for SilentReporter {
    fn report(&mut self, event: &RunEvent) {
        match event {
            RunEvent::TaskStart { reference, message } => {
                self.current = Some((reference.clone(), message.clone()));
            }
            RunEvent::TaskSkip { .. } | RunEvent::TaskComplete { .. } => {
                self.current = None;
            }
            RunEvent::TaskFatal { error } => {
                let mut err = std::io::stderr().lock();
                if let Some((reference, message)) = self.current.take() {
                    let _ = writeln!(err, "{}", header(&reference, &message));
                }
                let _ = writeln!(err, "  Failed: {error}");
            }
        }
    }
}

/// One line per lifecycle event.
#[derive(Debug, Default)]
pub struct VerboseReporter;

impl VerboseReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for VerboseReporter {
    fn report(&mut self, event: &RunEvent) {
        let mut err = std::io::stderr().lock();
        let _ = match event {
            RunEvent::TaskStart { reference, message } => {
                writeln!(err, "{}", header(reference, message))
            }
            RunEvent::TaskSkip { .. } => writeln!(err, "  Skipped"),
            RunEvent::TaskComplete { .. } => writeln!(err, "  Completed"),
            RunEvent::TaskFatal { error } => writeln!(err, "  Failed: {error}"),
        };
    }
}

fn header(reference: &str, message: &str) -> String {
    if message.is_empty() {
        format!("[{reference}]")
    } else {
        format!("[{reference}]: {message}")
    }
}
