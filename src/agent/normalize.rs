//! Cleanup of raw suggestion engine output into a runnable command.

const FENCE: &str = "```";

/// Fence info strings recognized as a language tag.
const SHELL_TAGS: &[&str] = &["bash", "sh", "zsh", "shell", "console"];

/// Strip whitespace and markdown code delimiters from an engine response.
///
/// Stripping is repeated until nothing changes, so nested fences are fully
/// removed and the function is idempotent.
pub fn normalize_command(raw: &str) -> String {
    let mut current = raw.trim();
    loop {
        let next = strip_once(current);
        if next.len() == current.len() {
            return current.to_string();
        }
        current = next;
    }
}

fn strip_once(text: &str) -> &str {
    let text = text.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        return strip_fenced_body(rest);
    }

    // Only a single wrapped span: "`a` | `b`" is command substitution.
    if text.len() >= 2
        && text.starts_with('`')
        && text.ends_with('`')
        && !text[1..text.len() - 1].contains('`')
    {
        return text[1..text.len() - 1].trim();
    }

    text
}

/// `rest` is everything after the opening fence.
fn strip_fenced_body(rest: &str) -> &str {
    let body = match rest.split_once('\n') {
        // Fence line holds nothing or a shell tag; anything else is a command.
        Some((first, remainder)) if first.trim().is_empty() || is_shell_tag(first.trim()) => {
            remainder
        }
        Some(_) => rest,
        // ```bash echo hi```
        None => match rest.trim_start().split_once(char::is_whitespace) {
            Some((tag, command)) if is_shell_tag(tag) => command,
            _ => rest,
        },
    };

    let body = body.trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

fn is_shell_tag(s: &str) -> bool {
    SHELL_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(s))
}
