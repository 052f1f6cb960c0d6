//! Candidate summarizer — display name, short overview and skills from resume text.

use crate::analysis::models::CandidateSummary;
use crate::analysis::prompts::{fill_template, CANDIDATE_SUMMARY_PROMPT_TEMPLATE};
use crate::llm_client::coerce::{coerce, string_field, string_list_field};
use crate::llm_client::{LlmError, Oracle};

/// Summarizes non-empty resume text. Callers handle empty extraction themselves.
///
/// The oracle is told to answer "Unknown" when no name is present; that value is
/// passed through unchanged and resolved by the pipeline.
pub async fn summarize_candidate(
    oracle: &dyn Oracle,
    raw_text: &str,
) -> Result<CandidateSummary, LlmError> {
    let prompt = fill_template(CANDIDATE_SUMMARY_PROMPT_TEMPLATE, &[("raw_text", raw_text)]);
    let data = coerce(&oracle.invoke(&prompt).await?);

    Ok(CandidateSummary {
        candidate_name: string_field(&data, "candidate_name"),
        overview: string_field(&data, "overview").unwrap_or_default(),
        skills: string_list_field(&data, "skills"),
    })
}
