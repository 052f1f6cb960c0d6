use std::sync::Arc;

use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::llm_client::Oracle;
use crate::storage::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The scoring oracle. Production: `LlmClient`; tests swap in a scripted fake.
    pub oracle: Arc<dyn Oracle>,
    /// Resume text extractor. Default: `PdfTextExtractor`.
    pub extractor: Arc<dyn TextExtractor>,
    pub store: JobStore,
}
