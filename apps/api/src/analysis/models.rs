//! Typed records for one ranking run.
//!
//! `CandidateRecord` is internal scoring state; only `RankedResume` and
//! `AnalysisResult` cross the public boundary and get persisted.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Weight of the requirements score in the fused final score, in tenths.
pub const REQUIREMENTS_WEIGHT_TENTHS: u32 = 6;
/// Weight of the relative score in the fused final score, in tenths.
pub const RELATIVE_WEIGHT_TENTHS: u32 = 4;

/// Neutral relative score: parity with the baseline.
pub const RELATIVE_PARITY: u8 = 50;

pub const NO_TEXT_RATIONALE: &str = "No readable text found";

// ────────────────────────────────────────────────────────────────────────────
// Oracle step outputs
// ────────────────────────────────────────────────────────────────────────────

/// Candidate summarizer output. `candidate_name` is `None` when the oracle
/// omitted it; the "Unknown" fallback is applied by the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSummary {
    pub candidate_name: Option<String>,
    pub overview: String,
    pub skills: Vec<String>,
}

/// Requirements matcher output. `match_score` is the raw value from the oracle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JdMatch {
    pub match_score: i64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub analysis: String,
}

/// Relative comparator output. `relative_score` is always within [0, 100].
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeComparison {
    pub relative_score: u8,
    pub reason: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Internal record
// ────────────────────────────────────────────────────────────────────────────

/// One candidate document's scoring state for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub document_name: String,
    pub display_name: String,
    pub overview: String,
    pub requirements_score: u8,
    pub matched_items: Vec<String>,
    pub missing_items: Vec<String>,
    pub rationale: String,
    /// Set during the comparison pass.
    pub relative_score: Option<u8>,
    /// Set once every record has a relative score.
    pub final_score: Option<u8>,
}

impl CandidateRecord {
    /// Record for a document whose text could not be extracted.
    pub fn unreadable(document_name: &str) -> Self {
        Self {
            document_name: document_name.to_string(),
            display_name: display_name_from_document(document_name),
            overview: String::new(),
            requirements_score: 0,
            matched_items: Vec::new(),
            missing_items: Vec::new(),
            rationale: NO_TEXT_RATIONALE.to_string(),
            relative_score: None,
            final_score: None,
        }
    }

    fn to_public(&self) -> RankedResume {
        RankedResume {
            resume_name: self.document_name.clone(),
            candidate_name: self.display_name.clone(),
            final_score: self.final_score.unwrap_or_default(),
            matched_skills: self.matched_items.clone(),
            missing_skills: self.missing_items.clone(),
            analysis: self.rationale.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public result envelope
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResume {
    pub resume_name: String,
    pub candidate_name: String,
    pub final_score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_resumes: usize,
    pub job_description_points: Vec<String>,
    pub ranked_resumes: Vec<RankedResume>,
}

impl AnalysisResult {
    /// Projects ranked records onto the public view. Records must already be sorted.
    pub fn from_ranked(job_description_points: Vec<String>, ranked: &[CandidateRecord]) -> Self {
        let ranked_resumes: Vec<RankedResume> = ranked.iter().map(CandidateRecord::to_public).collect();
        Self {
            total_resumes: ranked_resumes.len(),
            job_description_points,
            ranked_resumes,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring helpers
// ────────────────────────────────────────────────────────────────────────────

/// `floor(0.6 * requirements + 0.4 * relative)`, computed in integers so the
/// truncation is exact.
pub fn fuse_scores(requirements_score: u8, relative_score: u8) -> u8 {
    let fused = (REQUIREMENTS_WEIGHT_TENTHS * u32::from(requirements_score)
        + RELATIVE_WEIGHT_TENTHS * u32::from(relative_score))
        / 10;
    fused.min(100) as u8
}

/// Clamps an oracle-provided score into [0, 100].
pub fn clamp_score(score: i64) -> u8 {
    score.clamp(0, 100) as u8
}

/// Human-readable name derived from a document name: extension dropped,
/// `_` and `-` become spaces, then title-cased.
///
/// `"jane_doe-resume.pdf"` → `"Jane Doe Resume"`.
pub fn display_name_from_document(document_name: &str) -> String {
    let stem = Path::new(document_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(document_name);

    title_case(&stem.replace(['_', '-'], " "))
}

/// Uppercases the first letter of every alphabetic run and lowercases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}
