//! Per-request pipeline: resolve, execute, classify.

use std::time::Duration;

use thiserror::Error;

use crate::config::Config;
use crate::tools::{ExecutionResult, ShellExecutor};

use super::engine::ResolveError;
use super::resolver::Resolver;

pub const CONFIGURATION_ERROR_TAG: &str = "Error: suggestion engine not configured";
pub const EXECUTION_ERROR_TAG: &str = "Error executing command.";
pub const UNEXPECTED_ERROR_TAG: &str = "An unexpected error occurred";

/// Every way a task can fail. `Display` is the text callers see.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("Error: suggestion engine not configured: {0}")]
    Configuration(String),

    #[error("Error: {0}")]
    Resolution(ResolveError),

    #[error("Error: The command timed out after {} seconds.", .0.as_secs())]
    Timeout(Duration),

    #[error("Error executing command.\nEXIT STATUS: {exit_code}\nSTDOUT:\n{stdout}\nSTDERR:\n{stderr}")]
    Failed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl TaskError {
    /// Stable kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::Resolution(_) => "resolution_error",
            Self::Timeout(_) => "execution_timeout",
            Self::Failed { .. } => "execution_failure",
            Self::Unexpected(_) => "unexpected_fault",
        }
    }
}

impl From<ResolveError> for TaskError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NotConfigured(reason) => Self::Configuration(reason),
            ResolveError::Malformed(detail) => {
                Self::Unexpected(format!("malformed suggestion engine response: {}", detail))
            }
            other => Self::Resolution(other),
        }
    }
}

/// Pipeline position, used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStage {
    Resolving,
    Resolved,
    Executing,
    Done,
}

impl std::fmt::Display for TaskStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolving => write!(f, "resolving"),
            Self::Resolved => write!(f, "resolved"),
            Self::Executing => write!(f, "executing"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Result of one task, before it is rendered for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: String,
    pub agent: String,
    /// Normalized command, absent when resolution failed.
    pub command: Option<String>,
    /// Trimmed stdout on success.
    pub outcome: Result<String, TaskError>,
}

impl TaskReport {
    /// Report for a failure outside the pipeline itself (e.g. a panicked task).
    pub fn fault(task: &str, agent: &str, detail: impl Into<String>) -> Self {
        Self {
            task: task.to_string(),
            agent: agent.to_string(),
            command: None,
            outcome: Err(TaskError::Unexpected(detail.into())),
        }
    }
}

/// Turns a task into a command, runs it, and reports the outcome.
#[derive(Clone)]
pub struct Agent {
    resolver: Resolver,
    executor: ShellExecutor,
}

impl Agent {
    /// Create an agent with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            resolver: Resolver::from_config(config),
            executor: ShellExecutor::new(config.command_timeout, config.max_output_bytes),
        }
    }

    pub fn from_parts(resolver: Resolver, executor: ShellExecutor) -> Self {
        Self { resolver, executor }
    }

    pub fn name(&self) -> &str {
        self.resolver.agent()
    }

    pub fn is_ready(&self) -> bool {
        self.resolver.is_ready()
    }

    /// Run a task to completion. Never fails; errors are in the report.
    pub async fn run_task(&self, task: &str) -> TaskReport {
        let mut report = TaskReport {
            task: task.to_string(),
            agent: self.name().to_string(),
            command: None,
            outcome: Ok(String::new()),
        };

        tracing::debug!(stage = %TaskStage::Resolving, "Task started");
        let resolved = match self.resolver.resolve(task).await {
            Ok(resolved) => resolved,
            Err(e) => {
                report.outcome = Err(e.into());
                return finish(report);
            }
        };
        tracing::debug!(stage = %TaskStage::Resolved, command = %resolved.normalized_text);

        let command = resolved.normalized_text;
        tracing::debug!(stage = %TaskStage::Executing);
        report.outcome = match self.executor.run(&command).await {
            Ok(result) => classify(result, self.executor.timeout()),
            Err(e) => Err(TaskError::Unexpected(e.to_string())),
        };
        report.command = Some(command);

        finish(report)
    }
}

/// Map a finished process to success output or an error kind.
pub fn classify(result: ExecutionResult, timeout: Duration) -> Result<String, TaskError> {
    if result.timed_out {
        return Err(TaskError::Timeout(timeout));
    }
    if result.success() {
        return Ok(result.stdout.trim().to_string());
    }
    Err(TaskError::Failed {
        exit_code: result.exit_code,
        stdout: result.stdout.trim().to_string(),
        stderr: result.stderr.trim().to_string(),
    })
}

fn finish(report: TaskReport) -> TaskReport {
    match &report.outcome {
        Ok(_) => tracing::info!(stage = %TaskStage::Done, "Task succeeded"),
        Err(e @ TaskError::Unexpected(_)) => tracing::error!(
            stage = %TaskStage::Done,
            kind = e.kind(),
            error = %e,
            "Task failed"
        ),
        Err(e) => tracing::warn!(
            stage = %TaskStage::Done,
            kind = e.kind(),
            error = %e,
            "Task failed"
        ),
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::SuggestionEngine;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Echoes the task back as the command.
    struct EchoEngine;

    #[async_trait]
    impl SuggestionEngine for EchoEngine {
        fn name(&self) -> &str {
            "echo-engine"
        }

        async fn suggest(&self, task: &str) -> Result<String, ResolveError> {
            Ok(format!("```sh\n{}\n```", task))
        }
    }

    struct FailingEngine(ResolveError);

    #[async_trait]
    impl SuggestionEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing-engine"
        }

        async fn suggest(&self, _task: &str) -> Result<String, ResolveError> {
            Err(self.0.clone())
        }
    }

    fn agent_with(engine: Arc<dyn SuggestionEngine>, timeout: Duration) -> Agent {
        Agent::from_parts(
            Resolver::with_engine(engine),
            ShellExecutor::new(timeout, 100_000),
        )
    }

    #[test]
    fn classify_success_trims_stdout() {
        let result = ExecutionResult {
            exit_code: 0,
            stdout: "  hello \n".to_string(),
            stderr: "ignored".to_string(),
            timed_out: false,
        };
        assert_eq!(classify(result, Duration::from_secs(1)), Ok("hello".to_string()));
    }

    #[test]
    fn classify_failure_renders_sections() {
        let result = ExecutionResult {
            exit_code: 3,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
        };
        let err = classify(result, Duration::from_secs(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error executing command.\nEXIT STATUS: 3\nSTDOUT:\n\nSTDERR:\n"
        );
        assert_eq!(err.kind(), "execution_failure");
    }

    #[test]
    fn classify_timeout_uses_fixed_message() {
        let result = ExecutionResult {
            exit_code: -1,
            stdout: "partial".to_string(),
            stderr: String::new(),
            timed_out: true,
        };
        let err = classify(result, Duration::from_secs(120)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error: The command timed out after 120 seconds."
        );
    }

    #[test]
    fn resolve_errors_map_to_task_kinds() {
        let err: TaskError = ResolveError::NotConfigured("no key".to_string()).into();
        assert!(err.to_string().starts_with(CONFIGURATION_ERROR_TAG));

        let err: TaskError = ResolveError::EmptyCommand.into();
        assert_eq!(err.kind(), "resolution_error");
        assert_eq!(err.to_string(), "Error: suggestion engine returned no command");

        let err: TaskError = ResolveError::Malformed("bad json".to_string()).into();
        assert_eq!(err.kind(), "unexpected_fault");
        assert!(err.to_string().starts_with(UNEXPECTED_ERROR_TAG));
    }

    #[tokio::test]
    async fn run_task_executes_resolved_command() {
        let agent = agent_with(Arc::new(EchoEngine), Duration::from_secs(10));
        let report = agent.run_task("echo hello").await;
        assert_eq!(report.agent, "echo-engine");
        assert_eq!(report.command.as_deref(), Some("echo hello"));
        assert_eq!(report.outcome, Ok("hello".to_string()));
    }

    #[tokio::test]
    async fn run_task_reports_failed_command() {
        let agent = agent_with(Arc::new(EchoEngine), Duration::from_secs(10));
        let report = agent.run_task("echo out; echo oops >&2; exit 2").await;
        assert_eq!(
            report.outcome,
            Err(TaskError::Failed {
                exit_code: 2,
                stdout: "out".to_string(),
                stderr: "oops".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn run_task_reports_timeout() {
        let agent = agent_with(Arc::new(EchoEngine), Duration::from_millis(200));
        let report = agent.run_task("sleep 10").await;
        assert_eq!(report.command.as_deref(), Some("sleep 10"));
        assert_eq!(
            report.outcome,
            Err(TaskError::Timeout(Duration::from_millis(200)))
        );
    }

    #[tokio::test]
    async fn resolution_failure_skips_execution() {
        let agent = agent_with(
            Arc::new(FailingEngine(ResolveError::Upstream("503".to_string()))),
            Duration::from_secs(10),
        );
        let report = agent.run_task("anything").await;
        assert!(report.command.is_none());
        assert_eq!(
            report.outcome,
            Err(TaskError::Resolution(ResolveError::Upstream("503".to_string())))
        );
    }

    #[tokio::test]
    async fn degraded_agent_reports_configuration_error() {
        let agent = Agent::from_parts(
            Resolver::unavailable("copilot-cli", "suggestion CLI `gh` was not found on PATH"),
            ShellExecutor::new(Duration::from_secs(10), 100_000),
        );
        assert!(!agent.is_ready());
        let report = agent.run_task("list files").await;
        assert!(report.command.is_none());
        let text = report.outcome.unwrap_err().to_string();
        assert!(text.starts_with(CONFIGURATION_ERROR_TAG));
        assert!(text.contains("gh"));
    }

    #[test]
    fn fault_report_is_unexpected() {
        let report = TaskReport::fault("t", "a", "task panicked");
        assert_eq!(report.outcome.unwrap_err().kind(), "unexpected_fault");
    }
}
