//! Resume ranking — orchestrates the full analysis pipeline.
//!
//! Flow: requirements digest → per-candidate extract/summarize/match →
//!       baseline selection → relative comparison → fusion → rank → persist.
//!
//! Malformed oracle output never aborts a run; each step substitutes neutral
//! defaults. A run fails only when the oracle transport fails, when there are
//! no candidates, or when the result cannot be written.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::jd_digest::summarize_requirements;
use crate::analysis::jd_match::compare_with_jd;
use crate::analysis::models::{
    clamp_score, display_name_from_document, fuse_scores, AnalysisResult, CandidateRecord,
};
use crate::analysis::relative::compare_relative;
use crate::analysis::summarizer::summarize_candidate;
use crate::extraction::TextExtractor;
use crate::llm_client::{LlmError, Oracle};

/// File name of the persisted result inside the output directory.
pub const ANALYSIS_RESULT_FILE: &str = "analysis_result.json";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No candidate documents supplied")]
    NoCandidates,

    #[error("Oracle call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to persist analysis result: {0}")]
    Persist(#[from] std::io::Error),

    #[error("Failed to serialize analysis result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Inputs for one ranking run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub resume_paths: Vec<PathBuf>,
    pub jd_text: String,
    pub output_dir: PathBuf,
}

/// Shared collaborators for a run. `concurrency` bounds how many candidates are
/// extracted/scored/compared at once; 1 keeps the run fully sequential.
pub struct AnalysisPipeline {
    oracle: Arc<dyn Oracle>,
    extractor: Arc<dyn TextExtractor>,
    concurrency: usize,
}

impl AnalysisPipeline {
    pub fn new(oracle: Arc<dyn Oracle>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            oracle,
            extractor,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Runs the full ranking pipeline and writes `analysis_result.json`.
    ///
    /// Steps:
    /// 1. summarize_requirements() → digest (advisory)
    /// 2. per candidate: extract → summarize_candidate() → compare_with_jd()
    /// 3. select_baseline() — barrier: every requirements score is known
    /// 4. per non-baseline candidate: compare_relative()
    /// 5. fuse_scores()
    /// 6. stable sort by final score, descending
    /// 7. project to the public envelope and persist
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        if request.resume_paths.is_empty() {
            return Err(AnalysisError::NoCandidates);
        }

        info!(
            "Analyzing {} resumes (concurrency={})",
            request.resume_paths.len(),
            self.concurrency
        );

        // Step 1: Requirements digest
        let jd_points = summarize_requirements(self.oracle.as_ref(), &request.jd_text).await?;

        // Step 2: Extraction + requirements scoring, results kept in input order
        // Stream items are owned so the run future stays `Send` behind axum handlers.
        let jd_text = request.jd_text.as_str();
        let mut records: Vec<CandidateRecord> = stream::iter(request.resume_paths.clone())
            .map(|path| async move { self.score_candidate(&path, jd_text).await })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        // Step 3: Baseline
        let baseline_idx = select_baseline(&records).ok_or(AnalysisError::NoCandidates)?;
        let baseline = records[baseline_idx].clone();
        info!(
            "Baseline: {} (requirements score {})",
            baseline.document_name, baseline.requirements_score
        );

        // Step 4: Relative comparison against the baseline
        let relative_scores: Vec<u8> = stream::iter(records.clone().into_iter().enumerate())
            .map(|(idx, record)| {
                let baseline = &baseline;
                async move {
                    if idx == baseline_idx {
                        return Ok::<_, LlmError>(record.requirements_score);
                    }
                    let comparison =
                        compare_relative(self.oracle.as_ref(), baseline, &record).await?;
                    debug!(
                        "{} vs baseline: {} ({})",
                        record.document_name, comparison.relative_score, comparison.reason
                    );
                    Ok(comparison.relative_score)
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        for (record, relative) in records.iter_mut().zip(relative_scores) {
            record.relative_score = Some(relative);
        }

        // Step 5: Fusion
        apply_final_scores(&mut records);

        // Step 6: Rank
        rank(&mut records);

        // Step 7: Shape + persist
        let result = AnalysisResult::from_ranked(jd_points, &records);
        persist_result(&request.output_dir, &result).await?;

        info!(
            "Analysis complete: {} resumes ranked, top={}",
            result.total_resumes,
            result
                .ranked_resumes
                .first()
                .map(|r| r.resume_name.as_str())
                .unwrap_or("-")
        );

        Ok(result)
    }

    /// Extracts, summarizes and requirement-scores a single document.
    async fn score_candidate(
        &self,
        path: &Path,
        jd_text: &str,
    ) -> Result<CandidateRecord, LlmError> {
        let document_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let raw_text = self.extract(path).await;
        if raw_text.trim().is_empty() {
            warn!("No readable text in {document_name}; scoring as 0");
            return Ok(CandidateRecord::unreadable(&document_name));
        }

        let summary = summarize_candidate(self.oracle.as_ref(), &raw_text).await?;
        let display_name = resolve_display_name(summary.candidate_name.as_deref(), &document_name);

        let jd_match = compare_with_jd(self.oracle.as_ref(), &summary.overview, jd_text).await?;
        let requirements_score = clamp_score(jd_match.match_score);
        if i64::from(requirements_score) != jd_match.match_score {
            warn!(
                "Match score {} for {document_name} out of range, clamped to {requirements_score}",
                jd_match.match_score
            );
        }

        debug!(
            "{document_name}: candidate={display_name}, requirements_score={requirements_score}, skills={}",
            summary.skills.len()
        );

        Ok(CandidateRecord {
            document_name,
            display_name,
            overview: summary.overview,
            requirements_score,
            matched_items: jd_match.matched_skills,
            missing_items: jd_match.missing_skills,
            rationale: jd_match.analysis,
            relative_score: None,
            final_score: None,
        })
    }

    /// Runs the extractor on the blocking pool. Extraction never fails the run.
    async fn extract(&self, path: &Path) -> String {
        let extractor = Arc::clone(&self.extractor);
        let owned = path.to_path_buf();
        match tokio::task::spawn_blocking(move || extractor.extract(&owned)).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Extraction task for {} failed: {e}", path.display());
                String::new()
            }
        }
    }
}

/// Uses the summarized name unless it is missing, blank or "Unknown".
fn resolve_display_name(candidate_name: Option<&str>, document_name: &str) -> String {
    match candidate_name.map(str::trim) {
        Some(name) if !name.is_empty() && !name.eq_ignore_ascii_case("unknown") => {
            name.to_string()
        }
        _ => display_name_from_document(document_name),
    }
}

/// Index of the record with the highest requirements score.
/// Ties go to the earliest record in input order.
pub fn select_baseline(records: &[CandidateRecord]) -> Option<usize> {
    let mut best: Option<(usize, u8)> = None;
    for (idx, record) in records.iter().enumerate() {
        match best {
            Some((_, score)) if record.requirements_score <= score => {}
            _ => best = Some((idx, record.requirements_score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Sets `final_score` on every record. Records without a relative score are
/// left untouched; the pipeline assigns relative scores to all records first.
fn apply_final_scores(records: &mut [CandidateRecord]) {
    for record in records.iter_mut() {
        if let Some(relative) = record.relative_score {
            record.final_score = Some(fuse_scores(record.requirements_score, relative));
        }
    }
}

/// Descending by final score. `sort_by` is stable, so ties keep input order.
fn rank(records: &mut [CandidateRecord]) {
    records.sort_by(|a, b| b.final_score.cmp(&a.final_score));
}

/// Writes the result envelope as pretty JSON, creating `output_dir` if needed.
pub async fn persist_result(output_dir: &Path, result: &AnalysisResult) -> Result<PathBuf, AnalysisError> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(ANALYSIS_RESULT_FILE);
    let json = serde_json::to_vec_pretty(result)?;
    tokio::fs::write(&path, json).await?;
    debug!("Wrote {}", path.display());
    Ok(path)
}
