//! System prompt for the reviewer.
//!
//! The prompt is inert configuration text. It comes from the configured
//! prompt file when one is set, otherwise from the built-in reviewer
//! instructions below.

use std::path::Path;

use crate::models::ReviewFormat;

/// Built-in reviewer instructions.
pub const DEFAULT_REVIEW_PROMPT: &str = "\
You are acting as a senior code reviewer for a Pull Request (PR).

Your task is to:
1. Review the changes for correctness, code quality, readability, maintainability, and security.
2. Identify any potential performance bottlenecks.
3. Check whether the code follows clean coding principles and naming conventions, and is consistent with the existing style.
4. Point out possible bugs, logical errors, or edge cases that may be missed.
5. Suggest improvements in a constructive and actionable way.
6. If everything is fine, explicitly say \"PR is clean\" with a brief explanation.

The user message is a JSON object mapping each changed file path to its full contents.

Format the review as markdown:
**File:** <filename>
- Issue 1: <description>
  Suggestion: <solution>

**Overall Review:**
<your summary here>

Only review the code provided. Do not assume or invent unrelated context.";

/// Appended in structured mode so the reply matches `ReviewReport`.
pub const STRUCTURED_REPLY_INSTRUCTIONS: &str = "\
Respond with a single JSON object and nothing else, no code fences: \
{\"prTitle\": \"<short title for the change>\", \"prDetails\": \"<the markdown review>\"}";

/// Resolve the system prompt.
///
/// A configured file has its newlines collapsed to spaces. A file that
/// cannot be read degrades to an empty prompt with a warning rather than
/// aborting startup. Structured mode always appends the JSON reply
/// contract.
pub fn load_system_prompt(prompt_file: Option<&Path>, format: ReviewFormat) -> String {
    let base = match prompt_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => collapse_newlines(&text),
            Err(e) => {
                tracing::warn!(
                    "could not read prompt file {}: {e}; continuing with an empty prompt",
                    path.display()
                );
                String::new()
            }
        },
        None => DEFAULT_REVIEW_PROMPT.to_string(),
    };

    match format {
        ReviewFormat::Raw => base,
        ReviewFormat::Structured if base.is_empty() => STRUCTURED_REPLY_INSTRUCTIONS.to_string(),
        ReviewFormat::Structured => format!("{base}\n\n{STRUCTURED_REPLY_INSTRUCTIONS}"),
    }
}

/// Replace every line break with a single space.
fn collapse_newlines(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace('\n', " ")
        .trim()
        .to_string()
}
