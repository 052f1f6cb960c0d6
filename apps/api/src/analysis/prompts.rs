// All oracle prompt templates for the analysis pipeline.
// Placeholders are `{name}` and are filled by `fill_template` before sending.

/// Requirements digest prompt. Replace `{jd_text}`.
pub const JD_DIGEST_PROMPT_TEMPLATE: &str = r#"You are a professional recruiter.

Summarize the job description into concise bullet points.

Return ONLY valid JSON:
{
  "points": ["point 1", "point 2"]
}

Job Description:
{jd_text}"#;

/// Candidate summary prompt. Replace `{raw_text}`.
pub const CANDIDATE_SUMMARY_PROMPT_TEMPLATE: &str = r#"You are a professional resume analyst.

From the resume text below, extract:

1. Candidate full name (if clearly mentioned at the top)
2. A 2-3 line professional summary
3. A list of key technical skills

Rules:
- If candidate name is not found, return "Unknown"
- Return ONLY valid JSON
- No explanations, no markdown

JSON format:
{
  "candidate_name": "string",
  "overview": "2-3 line professional summary",
  "skills": ["skill1", "skill2", "skill3"]
}

Resume:
{raw_text}"#;

/// Requirements match prompt. Replace `{overview}` and `{jd_text}`.
pub const JD_MATCH_PROMPT_TEMPLATE: &str = r#"You are a senior technical recruiter.

Evaluate how well the resume matches the job description.

Consider:
- Skill overlap
- Depth of experience
- Role relevance

Return ONLY JSON:
{
  "match_score": 0-100,
  "matched_skills": [],
  "missing_skills": [],
  "analysis": "2-3 sentence explanation"
}

Resume Summary:
{overview}

Job Description:
{jd_text}"#;

/// Relative comparison prompt.
/// Replace: {base_score}, {base_matched}, {base_missing}, {base_overview}, {other_overview}
pub const RELATIVE_PROMPT_TEMPLATE: &str = r#"You are a professional technical recruiter.

You are given a BASE resume which is already known to be a strong match
for the job description.

Your task:
- Evaluate the SECOND resume relative to the BASE resume
- Assign a numeric score between 0 and 100
- 50 means comparable to base
- Higher than 50 means stronger than base
- Lower than 50 means weaker than base

Return ONLY valid JSON:
{
  "relative_score": 0-100,
  "reason": "1-2 sentence explanation"
}

BASE RESUME:
JD Match Score: {base_score}
Matched Skills: {base_matched}
Missing Skills: {base_missing}
Summary: {base_overview}

SECOND RESUME:
Summary: {other_overview}"#;

/// Substitutes each `{key}` placeholder in one pass over the template.
///
/// Only the template is scanned, so braces inside substituted text (a job
/// description quoting `{overview}`, say) are never treated as placeholders.
/// Braces that do not name a known key are kept literally.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let placeholder = values.iter().find_map(|(key, value)| {
            tail.strip_prefix(key)
                .and_then(|after| after.strip_prefix('}'))
                .map(|after| (*value, after))
        });
        match placeholder {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_known_placeholders_only() {
        let filled = fill_template(r#"{"points": []} for {name}"#, &[("name", "Ada")]);
        assert_eq!(filled, r#"{"points": []} for Ada"#);
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        let filled = fill_template(
            "JD: {jd_text}\nResume: {overview}",
            &[("jd_text", "mention {overview} here"), ("overview", "Rust dev")],
        );
        assert_eq!(filled, "JD: mention {overview} here\nResume: Rust dev");
    }

    #[test]
    fn test_templates_keep_their_json_examples() {
        let filled = fill_template(JD_DIGEST_PROMPT_TEMPLATE, &[("jd_text", "Need Go")]);
        assert!(filled.contains(r#""points": ["point 1", "point 2"]"#));
        assert!(filled.ends_with("Need Go"));
        assert!(!filled.contains("{jd_text}"));
    }
}
