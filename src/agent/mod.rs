//! Agent module - turns a task description into an executed command.
//!
//! Each request goes through the same pipeline:
//! 1. Ask the suggestion engine for a command (CLI tool or hosted model)
//! 2. Normalize the answer (trim, strip code fences)
//! 3. Run it through the shell under a timeout
//! 4. Classify the outcome into a [`TaskReport`]

mod engine;
mod normalize;
mod prompt;
mod resolver;
mod runner;

pub use engine::{CliEngine, LlmEngine, ResolveError, SuggestionEngine};
pub use normalize::normalize_command;
pub use prompt::{build_command_prompt, SYSTEM_PROMPT};
pub use resolver::{ResolvedCommand, Resolver};
pub use runner::{
    classify, Agent, TaskError, TaskReport, TaskStage, CONFIGURATION_ERROR_TAG,
    EXECUTION_ERROR_TAG, UNEXPECTED_ERROR_TAG,
};
