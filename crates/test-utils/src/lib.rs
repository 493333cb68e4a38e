pub mod builders;
pub mod recording_task;

use std::ffi::OsString;
use std::sync::{Arc, Mutex, Once};

use stitches::grass::Session;
use stitches::pipeline::Scope;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Session that only remembers which scopes it was asked to enter.
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    entered: Arc<Mutex<Vec<Scope>>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entered(&self) -> Vec<Scope> {
        self.entered.lock().unwrap().clone()
    }
}

impl Session for RecordingSession {
    fn enter(&mut self, scope: &Scope) -> anyhow::Result<()> {
        self.entered.lock().unwrap().push(scope.clone());
        Ok(())
    }

    fn environment(&self) -> Vec<(OsString, OsString)> {
        vec![(OsString::from("STITCHES_TEST_SESSION"), OsString::from("1"))]
    }
}
