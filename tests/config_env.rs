//! `Config::from_env` against a controlled environment.
//!
//! One test in its own binary: the process environment is global, so the
//! steps run in sequence instead of racing each other.

use std::env;

use task_agent::agent::{Agent, CONFIGURATION_ERROR_TAG};
use task_agent::config::{Config, ConfigError, EngineConfig, DEFAULT_CLI_AGENT_NAME, DEFAULT_MODEL};

const ENGINE_VARS: &[&str] = &[
    "OPENROUTER_API_KEY",
    "LLM_API_KEY",
    "LLM_BASE_URL",
    "SUGGESTION_ENGINE",
    "AGENT_NAME",
    "DEFAULT_MODEL",
    "PORT",
    "SUGGEST_CLI",
    "SUGGEST_CLI_ARGS",
];

fn clear_env() {
    for name in ENGINE_VARS {
        env::remove_var(name);
    }
}

#[tokio::test]
async fn from_env_degrades_instead_of_failing() {
    clear_env();

    // No key: startup still succeeds, every task reports the reason.
    let config = Config::from_env().expect("missing key is not fatal");
    assert_eq!(config.agent_name, DEFAULT_MODEL);
    match &config.engine {
        EngineConfig::Unavailable { reason } => assert!(reason.contains("OPENROUTER_API_KEY")),
        other => panic!("expected Unavailable, got {:?}", other),
    }
    let agent = Agent::new(&config);
    assert!(!agent.is_ready());
    let report = agent.run_task("list files").await;
    assert!(report.command.is_none());
    let text = report.outcome.unwrap_err().to_string();
    assert!(text.starts_with(CONFIGURATION_ERROR_TAG));
    assert!(text.contains("OPENROUTER_API_KEY"));

    // Blank key counts as missing.
    env::set_var("OPENROUTER_API_KEY", "   ");
    let config = Config::from_env().expect("blank key is not fatal");
    assert!(!config.engine.is_ready());

    // CLI engine whose program is not installed.
    clear_env();
    env::set_var("SUGGESTION_ENGINE", "cli");
    env::set_var("SUGGEST_CLI", "definitely-not-installed-suggester");
    let config = Config::from_env().expect("missing CLI is not fatal");
    assert_eq!(config.agent_name, DEFAULT_CLI_AGENT_NAME);
    match &config.engine {
        EngineConfig::Unavailable { reason } => {
            assert!(reason.contains("definitely-not-installed-suggester"));
            assert!(reason.contains("not found on PATH"));
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }

    // CLI engine that exists.
    env::set_var("SUGGEST_CLI", "sh");
    env::set_var("SUGGEST_CLI_ARGS", "-c 'echo ls'");
    let config = Config::from_env().expect("cli config");
    match &config.engine {
        EngineConfig::Cli { program, args } => {
            assert!(program.ends_with("sh"));
            assert_eq!(args.first().map(String::as_str), Some("-c"));
        }
        other => panic!("expected Cli, got {:?}", other),
    }

    // Key present: LLM engine, agent named after the model.
    clear_env();
    env::set_var("LLM_API_KEY", " sk-test ");
    env::set_var("DEFAULT_MODEL", "test/model");
    let config = Config::from_env().expect("llm config");
    assert_eq!(config.agent_name, "test/model");
    match &config.engine {
        EngineConfig::Llm { api_key, model, .. } => {
            assert_eq!(api_key, "sk-test");
            assert_eq!(model, "test/model");
        }
        other => panic!("expected Llm, got {:?}", other),
    }

    // Malformed values are still startup errors.
    env::set_var("PORT", "abc");
    match Config::from_env() {
        Err(ConfigError::InvalidValue(name, _)) => assert_eq!(name, "PORT"),
        other => panic!("expected invalid PORT, got {:?}", other),
    }

    clear_env();
    env::set_var("SUGGESTION_ENGINE", "bogus");
    match Config::from_env() {
        Err(ConfigError::InvalidValue(name, _)) => assert_eq!(name, "SUGGESTION_ENGINE"),
        other => panic!("expected invalid SUGGESTION_ENGINE, got {:?}", other),
    }

    clear_env();
}
