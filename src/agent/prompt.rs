//! Prompt templates for command suggestion.

/// System prompt for the hosted model engine.
pub const SYSTEM_PROMPT: &str = "You translate task descriptions into POSIX shell commands. \
Reply with exactly one runnable command line. Pipelines, redirection and `&&` chains are allowed. \
Do not add explanations, comments, markdown or code fences.";

/// Build the user message for a task. The task is embedded verbatim.
pub fn build_command_prompt(task: &str) -> String {
    format!(
        r#"Return only the shell command that accomplishes the following task, with no explanation or formatting.

## Task
{task}

## Rules
1. Output exactly one command; combine steps with pipes or `&&` if needed.
2. The command runs non-interactively through `sh -c` and must finish on its own.
3. Do not wrap the command in backticks or a code block."#,
        task = task
    )
}
