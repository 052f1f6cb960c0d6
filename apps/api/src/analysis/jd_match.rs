//! Requirements matcher — scores one candidate overview against the job description.

use crate::analysis::models::JdMatch;
use crate::analysis::prompts::{fill_template, JD_MATCH_PROMPT_TEMPLATE};
use crate::llm_client::coerce::{coerce, int_field, string_field, string_list_field};
use crate::llm_client::{LlmError, Oracle};

/// Asks the oracle for a 0–100 match score plus matched/missing skills.
///
/// Missing or non-numeric `match_score` becomes 0. The score is returned as the
/// oracle gave it; range enforcement happens when the pipeline stores it.
pub async fn compare_with_jd(
    oracle: &dyn Oracle,
    overview: &str,
    jd_text: &str,
) -> Result<JdMatch, LlmError> {
    let prompt = fill_template(
        JD_MATCH_PROMPT_TEMPLATE,
        &[("overview", overview), ("jd_text", jd_text)],
    );
    let data = coerce(&oracle.invoke(&prompt).await?);

    Ok(JdMatch {
        match_score: int_field(&data, "match_score").unwrap_or(0),
        matched_skills: string_list_field(&data, "matched_skills"),
        missing_skills: string_list_field(&data, "missing_skills"),
        analysis: string_field(&data, "analysis").unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock;

    #[tokio::test]
    async fn test_match_parses_response() {
        let oracle = mock::fixed(
            r#"{"match_score": 82, "matched_skills": ["Python"], "missing_skills": ["Go"], "analysis": "Strong Python."}"#,
        );
        let result = compare_with_jd(&oracle, "Python developer", "Need Python and Go")
            .await
            .unwrap();
        assert_eq!(result.match_score, 82);
        assert_eq!(result.matched_skills, vec!["Python"]);
        assert_eq!(result.missing_skills, vec!["Go"]);
        assert_eq!(result.analysis, "Strong Python.");
    }

    #[tokio::test]
    async fn test_match_defaults_on_missing_keys() {
        let oracle = mock::fixed(r#"{"analysis": 5}"#);
        let result = compare_with_jd(&oracle, "x", "y").await.unwrap();
        assert_eq!(result, JdMatch::default());
    }

    #[tokio::test]
    async fn test_non_numeric_score_defaults_to_zero() {
        let oracle = mock::fixed(r#"{"match_score": "very high"}"#);
        let result = compare_with_jd(&oracle, "x", "y").await.unwrap();
        assert_eq!(result.match_score, 0);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_not_clamped_here() {
        let oracle = mock::fixed(r#"{"match_score": 140}"#);
        let result = compare_with_jd(&oracle, "x", "y").await.unwrap();
        assert_eq!(result.match_score, 140);
    }

    #[tokio::test]
    async fn test_prompt_contains_overview_and_requirements() {
        let oracle = mock::fixed("{}");
        compare_with_jd(&oracle, "Experienced backend engineer", "Need Python")
            .await
            .unwrap();
        let prompt = &oracle.prompts()[0];
        assert!(prompt.contains("Experienced backend engineer"));
        assert!(prompt.contains("Need Python"));
    }

    #[tokio::test]
    async fn test_placeholder_text_in_job_description_stays_literal() {
        let oracle = mock::fixed("{}");
        compare_with_jd(&oracle, "Rust engineer", "Template must render {overview} verbatim")
            .await
            .unwrap();
        let prompt = &oracle.prompts()[0];
        assert!(prompt.contains("Template must render {overview} verbatim"));
        assert_eq!(prompt.matches("Rust engineer").count(), 1);
    }
}
