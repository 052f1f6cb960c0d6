//! Text extraction — turns an uploaded resume into plain text.
//!
//! Contract: `extract` never fails. An empty string means "no readable text"
//! and the pipeline ranks that candidate with a zero requirements score.

use std::path::Path;

use tracing::warn;

/// Pluggable extractor. Carried in `AppState` as `Arc<dyn TextExtractor>`.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> String;
}

/// PDF extractor backed by `pdf-extract`. Concatenates the text of every page.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> String {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Could not read {}: {e}", path.display());
                return String::new();
            }
        };

        // pdf-extract panics on some malformed documents instead of returning Err.
        let extracted =
            std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes));

        match extracted {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!("Text extraction failed for {}: {e}", path.display());
                String::new()
            }
            Err(_) => {
                warn!("Text extraction panicked for {}", path.display());
                String::new()
            }
        }
    }
}
