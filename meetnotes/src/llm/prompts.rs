//! Prompt templates for transcript summarization
//!
//! Everything here is pure string building. Identical inputs always produce
//! identical prompts.

/// Behavioral directives sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are a precise meeting notes summarizer. \
Return clear, structured output. \
If the user asks for bullet points, use short bullets. \
If they ask to highlight action items, include an 'Action Items' section with assignee and due date when possible. \
Keep it concise but comprehensive.";

/// Instruction used when the caller does not supply one.
pub const DEFAULT_INSTRUCTION: &str =
    "Summarize in concise bullet points with key decisions and action items.";

pub const TRANSCRIPT_START: &str = "=== TRANSCRIPT START ===";
pub const TRANSCRIPT_END: &str = "=== TRANSCRIPT END ===";

/// Section layout the model is asked to follow.
pub const OUTPUT_TEMPLATE: &str = "## Executive Summary
- ...

## Key Points
- ...

## Decisions
- ...

## Action Items
- [Assignee] Action - Due: <date>";

/// The two messages of a summarization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPrompt {
    pub system: String,
    pub content: String,
}

/// Pick the caller's instruction, or the default when it is absent or blank.
pub fn resolve_instruction(instruction: Option<&str>) -> &str {
    instruction
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_INSTRUCTION)
}

/// Generate the system and user messages for summarizing a transcript
///
/// # Example
/// ```
/// use meetnotes::llm::prompts::{summary_prompt, DEFAULT_INSTRUCTION};
///
/// let prompt = summary_prompt("Team decided to ship v2 next week.", None);
/// assert!(prompt.content.contains("ship v2"));
/// assert!(prompt.content.contains(DEFAULT_INSTRUCTION));
/// ```
pub fn summary_prompt(transcript: &str, instruction: Option<&str>) -> SummaryPrompt {
    let instruction = resolve_instruction(instruction);

    let content = [
        format!("{TRANSCRIPT_START}\n{transcript}\n{TRANSCRIPT_END}"),
        format!("\nUser Instruction: {instruction}"),
        format!("\nOutput format template: \n{OUTPUT_TEMPLATE}"),
    ]
    .join("\n");

    SummaryPrompt {
        system: SYSTEM_PROMPT.to_string(),
        content,
    }
}
