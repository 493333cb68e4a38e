// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`registry`] maps task-kind names to callables (built-ins first, then
//!   `module:function` references).
//! - [`builtins`] holds the `script` and `grass` kinds.
//! - [`context`] is what a task function receives besides its parameters.
//! - [`executor`] applies a planner verdict: skip, abort, or invoke.

pub mod builtins;
pub mod context;
pub mod executor;
pub mod registry;

pub use context::{CapturedOutput, TaskContext};
pub use executor::{Executor, Outcome};
pub use registry::{TaskFn, TaskModule, TaskRegistry};
