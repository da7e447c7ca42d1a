//! Suggestion engines: the external tools that propose a shell command.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::llm::{ChatMessage, LlmClient, LlmError};
use crate::tools::kill_process_group;

use super::prompt::{build_command_prompt, SYSTEM_PROMPT};

/// Why a command could not be obtained for a task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Engine missing or misconfigured. Not transient.
    #[error("{0}")]
    NotConfigured(String),

    #[error("suggestion engine timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("suggestion engine request failed: {0}")]
    Upstream(String),

    #[error("suggestion engine returned an unreadable response: {0}")]
    Malformed(String),

    #[error("suggestion engine returned no command")]
    EmptyCommand,

    #[error("task description is empty")]
    EmptyTask,
}

/// Something that turns a task description into raw command text.
#[async_trait]
pub trait SuggestionEngine: Send + Sync {
    /// Short identifier of the strategy or model.
    fn name(&self) -> &str;

    /// Return the engine's unprocessed answer for `task`.
    async fn suggest(&self, task: &str) -> Result<String, ResolveError>;
}

/// Hosted model reached through an [`LlmClient`].
pub struct LlmEngine {
    llm: Arc<dyn LlmClient>,
    model: String,
    timeout: Duration,
}

impl LlmEngine {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            llm,
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl SuggestionEngine for LlmEngine {
    fn name(&self) -> &str {
        &self.model
    }

    async fn suggest(&self, task: &str) -> Result<String, ResolveError> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_command_prompt(task)),
        ];

        let response = self
            .llm
            .chat_completion(&self.model, &messages)
            .await
            .map_err(|e| match e {
                LlmError::Timeout => ResolveError::Timeout(self.timeout),
                LlmError::Status { status, body } if status == 401 || status == 403 => {
                    ResolveError::NotConfigured(format!(
                        "suggestion engine rejected credentials ({}): {}",
                        status,
                        body.trim()
                    ))
                }
                LlmError::Malformed(detail) => ResolveError::Malformed(detail),
                other => ResolveError::Upstream(other.to_string()),
            })?;

        if let Some(served_by) = response.model.as_deref() {
            tracing::debug!(model = %served_by, "Completion served");
        }

        Ok(response.content.unwrap_or_default())
    }
}

/// Local CLI that prints a command suggestion on stdout.
///
/// The task is passed as the final argv element and never goes through a
/// shell, so its contents cannot alter the resolver invocation.
pub struct CliEngine {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CliEngine {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<PathBuf>,
        args: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl SuggestionEngine for CliEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn suggest(&self, task: &str) -> Result<String, ResolveError> {
        tracing::debug!(program = %self.program.display(), "Asking CLI for a command");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(task)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Helpers the CLI starts must not outlive a timeout.
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResolveError::NotConfigured(format!(
                    "suggestion CLI `{}` was not found",
                    self.program.display()
                ))
            } else {
                ResolveError::Upstream(format!("failed to start suggestion CLI: {}", e))
            }
        })?;
        let pid = child.id();

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => {
                output.map_err(|e| ResolveError::Upstream(format!("suggestion CLI failed: {}", e)))?
            }
            Err(_) => {
                kill_process_group(pid);
                return Err(ResolveError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::Upstream(format!(
                "suggestion CLI exited with status {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
