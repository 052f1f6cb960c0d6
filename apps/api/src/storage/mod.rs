//! Job-scoped upload storage.
//!
//! Layout under the upload root:
//!
//! ```text
//! <root>/<job_id>/jd/        job description (.txt)
//! <root>/<job_id>/resumes/   candidate resumes (.pdf)
//! <root>/<job_id>/outputs/   analysis_result.json
//! ```
//!
//! Every run writes only inside its own job directory, so concurrent jobs
//! never contend on a path.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct JobStore {
    root: PathBuf,
}

impl JobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn job_dir(&self, job_id: Uuid) -> PathBuf {
        self.root.join(job_id.to_string())
    }

    pub fn jd_dir(&self, job_id: Uuid) -> PathBuf {
        self.job_dir(job_id).join("jd")
    }

    pub fn resume_dir(&self, job_id: Uuid) -> PathBuf {
        self.job_dir(job_id).join("resumes")
    }

    pub fn output_dir(&self, job_id: Uuid) -> PathBuf {
        self.job_dir(job_id).join("outputs")
    }

    /// Creates a new job namespace with an empty `jd/` directory.
    pub async fn create_job(&self) -> Result<Uuid> {
        let job_id = Uuid::new_v4();
        let jd_dir = self.jd_dir(job_id);
        fs::create_dir_all(&jd_dir)
            .await
            .with_context(|| format!("Failed to create {}", jd_dir.display()))?;
        Ok(job_id)
    }

    pub async fn job_exists(&self, job_id: Uuid) -> bool {
        is_dir(&self.job_dir(job_id)).await
    }

    /// Writes `bytes` to `dir/<file name>`, creating `dir` if needed.
    /// Only the final component of `filename` is used.
    pub async fn save_file(&self, dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = sanitize_filename(filename)?;
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let path = dir.join(name);
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Files in `dir` with the given extension (case-insensitive), sorted by name.
    /// A missing directory yields an empty list.
    pub async fn list_files(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        if !is_dir(dir).await {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut entries = fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to list {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && has_extension(&path, extension) {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }
}

pub async fn is_dir(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Reduces a client-supplied file name to its final path component.
fn sanitize_filename(filename: &str) -> Result<&str> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::trim)
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        bail!("Invalid file name '{filename}'");
    }
    Ok(name)
}
