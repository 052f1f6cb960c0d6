//! Axum route handlers for upload and analysis.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::models::AnalysisResult;
use crate::analysis::pipeline::{AnalysisPipeline, AnalysisRequest, ANALYSIS_RESULT_FILE};
use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::has_extension;

const JD_FIELD: &str = "job_description";
const RESUMES_FIELD: &str = "resumes";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JdIdQuery {
    pub jd_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadJdResponse {
    pub message: String,
    pub jd_id: Uuid,
    pub jd_file: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResumesResponse {
    pub message: String,
    pub jd_id: Uuid,
    pub uploaded_resumes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutputFiles {
    pub json: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub message: String,
    pub jd_id: Uuid,
    pub output_files: OutputFiles,
    pub result_summary: AnalysisResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /upload/jd
///
/// Accepts one `.txt` job description and opens a new job namespace for it.
pub async fn handle_upload_jd(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadJdResponse>, AppError> {
    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() != Some(JD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !has_extension(std::path::Path::new(&filename), "txt") {
            return Err(AppError::Validation(
                "Only .txt JD files allowed".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let jd_id = state.store.create_job().await?;
        let path = state
            .store
            .save_file(&state.store.jd_dir(jd_id), &filename, &bytes)
            .await?;
        info!("Job {jd_id}: stored job description {}", path.display());

        return Ok(Json(UploadJdResponse {
            message: "Job description uploaded successfully".to_string(),
            jd_id,
            jd_file: path.display().to_string(),
        }));
    }

    Err(AppError::Validation(format!(
        "Missing multipart field '{JD_FIELD}'"
    )))
}

/// POST /upload/resumes?jd_id=<uuid>
///
/// Stores one or more `.pdf` resumes under an existing job.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    Query(query): Query<JdIdQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResumesResponse>, AppError> {
    let jd_id = query.jd_id;
    if !state.store.job_exists(jd_id).await {
        return Err(AppError::NotFound("Invalid JD ID".to_string()));
    }

    let resume_dir = state.store.resume_dir(jd_id);
    let mut saved = Vec::new();

    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() != Some(RESUMES_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !has_extension(std::path::Path::new(&filename), "pdf") {
            return Err(AppError::Validation(
                "Only PDF resumes allowed".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let path = state.store.save_file(&resume_dir, &filename, &bytes).await?;
        if let Some(name) = path.file_name() {
            saved.push(name.to_string_lossy().into_owned());
        }
    }

    if saved.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing multipart field '{RESUMES_FIELD}'"
        )));
    }

    info!("Job {jd_id}: stored {} resumes", saved.len());

    Ok(Json(UploadResumesResponse {
        message: "Resumes uploaded successfully".to_string(),
        jd_id,
        uploaded_resumes: saved,
    }))
}

/// POST /analyze/:jd_id
///
/// Runs the ranking pipeline over every stored resume for the job and returns
/// the ranked result along with the path of the persisted artifact.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(jd_id): Path<Uuid>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let store = &state.store;
    let jd_dir = store.jd_dir(jd_id);
    let resume_dir = store.resume_dir(jd_id);
    let output_dir = store.output_dir(jd_id);

    if !crate::storage::is_dir(&jd_dir).await {
        return Err(AppError::Validation("Job description not found".to_string()));
    }
    if !crate::storage::is_dir(&resume_dir).await {
        return Err(AppError::Validation("Resumes not uploaded".to_string()));
    }

    let jd_files = store.list_files(&jd_dir, "txt").await?;
    let Some(jd_file) = jd_files.first() else {
        return Err(AppError::Validation("JD file missing".to_string()));
    };

    let resume_paths = store.list_files(&resume_dir, "pdf").await?;
    if resume_paths.is_empty() {
        return Err(AppError::Validation("No resumes found".to_string()));
    }

    let jd_bytes = tokio::fs::read(jd_file)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to read {}: {e}", jd_file.display())))?;
    let jd_text = String::from_utf8_lossy(&jd_bytes).into_owned();

    let pipeline = AnalysisPipeline::new(state.oracle.clone(), state.extractor.clone())
        .with_concurrency(state.config.analysis_concurrency);

    let result = pipeline
        .run(&AnalysisRequest {
            resume_paths,
            jd_text,
            output_dir: output_dir.clone(),
        })
        .await?;

    Ok(Json(AnalyzeResponse {
        message: "Analysis completed successfully".to_string(),
        jd_id,
        output_files: OutputFiles {
            json: output_dir.join(ANALYSIS_RESULT_FILE).display().to_string(),
        },
        result_summary: result,
    }))
}

async fn next_field<'a>(
    multipart: &'a mut Multipart,
) -> Result<Option<axum::extract::multipart::Field<'a>>, AppError> {
    multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))
}
