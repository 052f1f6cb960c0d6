//! Requirements digest — advisory bullet-point summary of the job description.
//!
//! Carries no weight in scoring; a malformed oracle response yields an empty digest.

use tracing::debug;

use crate::analysis::prompts::{fill_template, JD_DIGEST_PROMPT_TEMPLATE};
use crate::llm_client::coerce::{coerce, string_list_field};
use crate::llm_client::{LlmError, Oracle};

pub async fn summarize_requirements(
    oracle: &dyn Oracle,
    jd_text: &str,
) -> Result<Vec<String>, LlmError> {
    let prompt = fill_template(JD_DIGEST_PROMPT_TEMPLATE, &[("jd_text", jd_text)]);
    let response = oracle.invoke(&prompt).await?;
    let points = string_list_field(&coerce(&response), "points");
    debug!("Requirements digest: {} points", points.len());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock;

    #[tokio::test]
    async fn test_digest_reads_points() {
        let oracle = mock::fixed(r#"Sure! {"points": ["5+ years Python", "Go microservices"]}"#);
        let points = summarize_requirements(&oracle, "Need Python and Go experience")
            .await
            .unwrap();
        assert_eq!(points, vec!["5+ years Python", "Go microservices"]);
    }

    #[tokio::test]
    async fn test_digest_prompt_embeds_requirements() {
        let oracle = mock::fixed(r#"{"points": []}"#);
        summarize_requirements(&oracle, "Need Kubernetes").await.unwrap();
        let prompts = oracle.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Need Kubernetes"));
        assert!(!prompts[0].contains("{jd_text}"));
    }

    #[tokio::test]
    async fn test_malformed_digest_is_empty() {
        let oracle = mock::fixed("I cannot summarize this.");
        let points = summarize_requirements(&oracle, "anything").await.unwrap();
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let oracle = mock::unreachable();
        assert!(summarize_requirements(&oracle, "anything").await.is_err());
    }
}
