//! Task resolution: engine call plus normalization.

use std::sync::Arc;

use crate::config::{Config, EngineConfig};
use crate::llm::OpenRouterClient;

use super::engine::{CliEngine, LlmEngine, ResolveError, SuggestionEngine};
use super::normalize::normalize_command;

/// A command obtained for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Engine output as received.
    pub raw_text: String,
    /// Fence-stripped, trimmed command. Never empty.
    pub normalized_text: String,
}

/// Maps task strings to commands through the configured engine.
///
/// Built once at startup. If the engine could not be set up the reason is
/// kept and returned for every request.
#[derive(Clone)]
pub struct Resolver {
    engine: Result<Arc<dyn SuggestionEngine>, String>,
    agent: String,
}

impl Resolver {
    pub fn from_config(config: &Config) -> Self {
        let engine: Result<Arc<dyn SuggestionEngine>, String> = match &config.engine {
            EngineConfig::Llm {
                api_key,
                base_url,
                model,
            } => OpenRouterClient::new(api_key.clone(), base_url, config.engine_timeout)
                .map(|client| {
                    Arc::new(LlmEngine::new(
                        Arc::new(client),
                        model.clone(),
                        config.engine_timeout,
                    )) as Arc<dyn SuggestionEngine>
                })
                .map_err(|e| e.to_string()),
            EngineConfig::Cli { program, args } => Ok(Arc::new(CliEngine::new(
                config.agent_name.clone(),
                program.clone(),
                args.clone(),
                config.engine_timeout,
            ))),
            EngineConfig::Unavailable { reason } => Err(reason.clone()),
        };

        match &engine {
            Ok(_) => tracing::info!(agent = %config.agent_name, "Suggestion engine ready"),
            Err(reason) => tracing::warn!(
                agent = %config.agent_name,
                reason = %reason,
                "Suggestion engine unavailable; requests will report a configuration error"
            ),
        }

        Self {
            engine,
            agent: config.agent_name.clone(),
        }
    }

    /// Resolver backed by an explicit engine, reported under the engine's name.
    pub fn with_engine(engine: Arc<dyn SuggestionEngine>) -> Self {
        let agent = engine.name().to_string();
        Self {
            engine: Ok(engine),
            agent,
        }
    }

    /// Resolver in degraded mode.
    pub fn unavailable(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            engine: Err(reason.into()),
            agent: agent.into(),
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_ok()
    }

    /// Obtain a runnable command for `task`.
    ///
    /// Makes at most one engine call and never invents a command.
    pub async fn resolve(&self, task: &str) -> Result<ResolvedCommand, ResolveError> {
        let engine = self
            .engine
            .as_ref()
            .map_err(|reason| ResolveError::NotConfigured(reason.clone()))?;

        if task.trim().is_empty() {
            return Err(ResolveError::EmptyTask);
        }

        let raw_text = engine.suggest(task).await?;
        let normalized_text = normalize_command(&raw_text);

        if normalized_text.is_empty() {
            return Err(ResolveError::EmptyCommand);
        }

        tracing::debug!(command = %normalized_text, "Resolved command");

        Ok(ResolvedCommand {
            raw_text,
            normalized_text,
        })
    }
}
