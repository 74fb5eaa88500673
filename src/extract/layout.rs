//! Layout-aware extraction with pdf-extract, one page at a time.

use std::panic;

use super::backend::{ExtractionError, PdfSource, TextBackend, TextBackendType};

/// pdf-extract backend.
///
/// pdf-extract can panic on unusual fonts or broken streams; a panic is
/// turned into an extraction failure so the next backend gets a chance.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutTextBackend;

impl TextBackend for LayoutTextBackend {
    fn backend_type(&self) -> TextBackendType {
        TextBackendType::Layout
    }

    fn extract(&self, pdf: &PdfSource<'_>) -> Result<String, ExtractionError> {
        let bytes = pdf.bytes;
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes)) {
            Ok(Ok(pages)) => Ok(pages.join("\n")),
            Ok(Err(e)) => Err(ExtractionError::ExtractionFailed(e.to_string())),
            Err(_) => Err(ExtractionError::ExtractionFailed(
                "pdf-extract panicked".to_string(),
            )),
        }
    }
}
