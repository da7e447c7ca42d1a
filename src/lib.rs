//! # Task Agent
//!
//! Turns a natural-language task into a shell command and runs it.
//!
//! This library provides:
//! - An HTTP API (`GET /task?q=...`) returning the command and its output
//! - Two suggestion engines: a local CLI tool or a hosted model via OpenRouter
//! - A shell executor bounded only by a wall clock timeout
//!
//! ## Architecture
//!
//! Every request runs the same pipeline:
//! 1. Resolve: ask the suggestion engine for one command, strip code fences
//! 2. Execute: run it with `sh -c` under the configured timeout
//! 3. Report: classify the outcome; errors become tagged text in `output`
//!
//! Commands are executed without any sandbox. Do not expose this service
//! to callers you would not give a shell to.
//!
//! ## Example
//!
//! ```rust,ignore
//! use task_agent::{agent::Agent, config::Config};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::new(&config);
//! let report = agent.run_task("show free disk space").await;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod tools;

pub use config::Config;
