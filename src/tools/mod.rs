//! Host-side capabilities used by the task pipeline.

mod terminal;

pub use terminal::{ExecError, ExecutionResult, ShellExecutor};
pub(crate) use terminal::kill_process_group;
