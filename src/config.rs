//! Configuration management for the task agent.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `SUGGESTION_ENGINE` - Optional. `llm` or `cli`. Defaults to `llm`.
//! - `OPENROUTER_API_KEY` - API key for the `llm` engine (`LLM_API_KEY` is accepted too).
//! - `LLM_BASE_URL` - Optional. OpenAI-compatible base URL. Defaults to OpenRouter.
//! - `DEFAULT_MODEL` - Optional. Model used by the `llm` engine. Defaults to `openai/gpt-4o-mini`.
//! - `SUGGEST_CLI` - Optional. Program used by the `cli` engine. Defaults to `gh`.
//! - `SUGGEST_CLI_ARGS` - Optional. Arguments placed before the task. Defaults to `copilot suggest -t shell`.
//! - `AGENT_NAME` - Optional. Overrides the `agent` identifier reported to callers.
//! - `OPERATOR_EMAIL` - Optional. Identity echoed in every response.
//! - `COMMAND_TIMEOUT_SECS` - Optional. Wall clock limit for executed commands. Defaults to `120`.
//! - `ENGINE_TIMEOUT_SECS` - Optional. Limit for one suggestion engine call. Defaults to `60`.
//! - `MAX_OUTPUT_BYTES` - Optional. Per-stream capture cap. Defaults to `100000`.
//!
//! A missing API key or CLI program does not fail startup. The engine is
//! recorded as [`EngineConfig::Unavailable`] and every request reports it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_CLI_PROGRAM: &str = "gh";
pub const DEFAULT_CLI_ARGS: &str = "copilot suggest -t shell";
pub const DEFAULT_CLI_AGENT_NAME: &str = "copilot-cli";
pub const DEFAULT_OPERATOR_EMAIL: &str = "operator@localhost";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Which suggestion engine resolves tasks, decided once at startup.
#[derive(Debug, Clone)]
pub enum EngineConfig {
    /// Hosted model behind an OpenAI-compatible chat completions API.
    Llm {
        api_key: String,
        base_url: String,
        model: String,
    },
    /// Local CLI tool that prints a shell command for a task.
    Cli { program: PathBuf, args: Vec<String> },
    /// The selected engine could not be set up; requests report this reason.
    Unavailable { reason: String },
}

impl EngineConfig {
    pub fn is_ready(&self) -> bool {
        !matches!(self, Self::Unavailable { .. })
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Suggestion engine settings
    pub engine: EngineConfig,

    /// Identifier reported in the `agent` field
    pub agent_name: String,

    /// Static identity reported in the `email` field
    pub operator_email: String,

    /// Wall clock limit for an executed command
    pub command_timeout: Duration,

    /// Limit for a single suggestion engine call
    pub engine_timeout: Duration,

    /// Maximum bytes kept per captured stream
    pub max_output_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for malformed values. Missing
    /// engine credentials are not an error; see [`EngineConfig::Unavailable`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_env("PORT", 3000u16)?;
        let command_timeout = Duration::from_secs(parse_env("COMMAND_TIMEOUT_SECS", 120u64)?);
        let engine_timeout = Duration::from_secs(parse_env("ENGINE_TIMEOUT_SECS", 60u64)?);
        let max_output_bytes = parse_env("MAX_OUTPUT_BYTES", 100_000usize)?;

        let engine_kind = std::env::var("SUGGESTION_ENGINE").unwrap_or_else(|_| "llm".to_string());
        let engine = match engine_kind.trim().to_ascii_lowercase().as_str() {
            "llm" | "" => llm_engine_from_env(),
            "cli" => cli_engine_from_env(),
            other => {
                return Err(ConfigError::InvalidValue(
                    "SUGGESTION_ENGINE".to_string(),
                    format!("expected `llm` or `cli`, got: {}", other),
                ))
            }
        };

        let agent_name = std::env::var("AGENT_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default_agent_name(&engine_kind));

        let operator_email = std::env::var("OPERATOR_EMAIL")
            .unwrap_or_else(|_| DEFAULT_OPERATOR_EMAIL.to_string());

        Ok(Self {
            host,
            port,
            engine,
            agent_name,
            operator_email,
            command_timeout,
            engine_timeout,
            max_output_bytes,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(engine: EngineConfig, agent_name: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            engine,
            agent_name: agent_name.into(),
            operator_email: DEFAULT_OPERATOR_EMAIL.to_string(),
            command_timeout: Duration::from_secs(120),
            engine_timeout: Duration::from_secs(60),
            max_output_bytes: 100_000,
        }
    }
}

fn llm_engine_from_env() -> EngineConfig {
    let api_key = std::env::var("OPENROUTER_API_KEY")
        .or_else(|_| std::env::var("LLM_API_KEY"))
        .ok()
        .filter(|k| !k.trim().is_empty());

    let Some(api_key) = api_key else {
        return EngineConfig::Unavailable {
            reason: ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()).to_string(),
        };
    };

    EngineConfig::Llm {
        api_key: api_key.trim().to_string(),
        base_url: std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
        model: std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
    }
}

fn cli_engine_from_env() -> EngineConfig {
    let program = std::env::var("SUGGEST_CLI").unwrap_or_else(|_| DEFAULT_CLI_PROGRAM.to_string());
    let args = std::env::var("SUGGEST_CLI_ARGS")
        .unwrap_or_else(|_| DEFAULT_CLI_ARGS.to_string())
        .split_whitespace()
        .map(str::to_string)
        .collect();

    match find_program(&program) {
        Some(program) => EngineConfig::Cli { program, args },
        None => EngineConfig::Unavailable {
            reason: format!("suggestion CLI `{}` was not found on PATH", program),
        },
    }
}

fn default_agent_name(engine_kind: &str) -> String {
    if engine_kind.trim().eq_ignore_ascii_case("cli") {
        DEFAULT_CLI_AGENT_NAME.to_string()
    } else {
        std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
    }
}

/// Locate an executable, either as an explicit path or via `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let program = program.trim();
    if program.is_empty() {
        return None;
    }

    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|full| full.is_file())
}

fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_program_resolves_sh_from_path() {
        assert!(find_program("sh").is_some());
    }

    #[test]
    fn find_program_rejects_missing_binary() {
        assert!(find_program("definitely-not-a-real-binary-4b1c").is_none());
        assert!(find_program("   ").is_none());
    }

    #[test]
    fn find_program_accepts_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("suggest");
        std::fs::write(&script, "#!/bin/sh\necho ls\n").expect("write script");
        assert_eq!(
            find_program(script.to_str().expect("utf8 path")),
            Some(script.clone())
        );
        assert!(find_program(dir.path().join("missing").to_str().expect("utf8 path")).is_none());
    }

    #[test]
    fn unavailable_engine_is_not_ready() {
        let engine = EngineConfig::Unavailable {
            reason: "no key".to_string(),
        };
        assert!(!engine.is_ready());
        let config = Config::new(engine, "test-agent");
        assert_eq!(config.command_timeout, Duration::from_secs(120));
        assert_eq!(config.operator_email, DEFAULT_OPERATOR_EMAIL);
    }
}
