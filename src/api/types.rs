//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::agent::TaskReport;

/// Query string of `GET /task`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskQuery {
    /// The task description
    pub q: String,
}

/// Body of every `GET /task` response, success or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskResponse {
    /// Echo of the task description
    pub task: String,

    /// Resolution strategy or model that produced the command
    pub agent: String,

    /// Normalized command; empty when resolution failed
    pub generated_command: String,

    /// Trimmed stdout, or a tagged error message
    pub output: String,

    /// Static operator identity
    pub email: String,
}

impl TaskResponse {
    /// Render a report for the wire. Error kinds become tagged text here.
    pub fn from_report(report: TaskReport, email: &str) -> Self {
        let output = match report.outcome {
            Ok(stdout) => stdout,
            Err(e) => e.to_string(),
        };

        Self {
            task: report.task,
            agent: report.agent,
            generated_command: report.command.unwrap_or_default(),
            output,
            email: email.to_string(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status (`ok` or `degraded`)
    pub status: String,

    /// Service version
    pub version: String,

    /// Resolution strategy or model in use
    pub agent: String,

    /// Whether the suggestion engine is configured
    pub engine_ready: bool,
}
