//! Relative comparator — places a candidate on a 0–100 scale against the baseline.
//!
//! 50 means parity with the baseline. The result feeds the linear fusion
//! directly, so it is always clamped into [0, 100].

use tracing::warn;

use crate::analysis::models::{clamp_score, CandidateRecord, RelativeComparison, RELATIVE_PARITY};
use crate::analysis::prompts::{fill_template, RELATIVE_PROMPT_TEMPLATE};
use crate::llm_client::coerce::{coerce, int_field, string_field};
use crate::llm_client::{LlmError, Oracle};

pub async fn compare_relative(
    oracle: &dyn Oracle,
    baseline: &CandidateRecord,
    other: &CandidateRecord,
) -> Result<RelativeComparison, LlmError> {
    let prompt = build_relative_prompt(baseline, other);
    let data = coerce(&oracle.invoke(&prompt).await?);

    let relative_score = match int_field(&data, "relative_score") {
        Some(raw) => {
            let clamped = clamp_score(raw);
            if i64::from(clamped) != raw {
                warn!(
                    "Relative score {raw} for {} out of range, clamped to {clamped}",
                    other.document_name
                );
            }
            clamped
        }
        None => RELATIVE_PARITY,
    };

    Ok(RelativeComparison {
        relative_score,
        reason: string_field(&data, "reason").unwrap_or_default(),
    })
}

fn build_relative_prompt(baseline: &CandidateRecord, other: &CandidateRecord) -> String {
    let base_score = baseline.requirements_score.to_string();
    let base_matched = format!("{:?}", baseline.matched_items);
    let base_missing = format!("{:?}", baseline.missing_items);
    fill_template(
        RELATIVE_PROMPT_TEMPLATE,
        &[
            ("base_score", &base_score),
            ("base_matched", &base_matched),
            ("base_missing", &base_missing),
            ("base_overview", &baseline.overview),
            ("other_overview", &other.overview),
        ],
    )
}
