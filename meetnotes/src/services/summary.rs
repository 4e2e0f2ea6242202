use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::llm::prompts::summary_prompt;
use crate::llm::Summarizer;

/// Returned when the provider answers without any text.
///
/// This is a deliberate fallback, not an error: the request still succeeds.
pub const NO_SUMMARY_PLACEHOLDER: &str = "No summary generated.";

/// Summarization gateway: prompt assembly plus one completion call.
#[derive(Clone)]
pub struct SummaryService {
    summarizer: Arc<dyn Summarizer>,
}

impl SummaryService {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }

    /// Summarize a resolved transcript.
    ///
    /// Provider failures surface as [`AppError::Summarization`], which keeps
    /// the cause for the server log and renders a generic message.
    pub async fn summarize(&self, transcript: &str, instruction: Option<&str>) -> Result<String> {
        let prompt = summary_prompt(transcript, instruction);

        let completion = self
            .summarizer
            .complete(&prompt.system, &prompt.content)
            .await
            .map_err(|error| AppError::Summarization(error.to_string()))?;

        let summary = completion.trim();
        if summary.is_empty() {
            tracing::warn!("Provider returned no summary text, using placeholder");
            return Ok(NO_SUMMARY_PLACEHOLDER.to_string());
        }

        tracing::info!(
            transcript_len = transcript.len(),
            summary_len = summary.len(),
            "Summary generated"
        );
        Ok(summary.to_string())
    }
}
