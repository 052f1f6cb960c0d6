pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Resumes are small PDFs, but a batch upload easily exceeds axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/upload/jd", post(handlers::handle_upload_jd))
        .route("/upload/resumes", post(handlers::handle_upload_resumes))
        .route("/analyze/:jd_id", post(handlers::handle_analyze))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
