//! Page-by-page extraction with lopdf.

use lopdf::Document;

use super::backend::{ExtractionError, PdfSource, TextBackend, TextBackendType};

/// lopdf backend. Lower fidelity than pdf-extract but more tolerant.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedTextBackend;

impl TextBackend for EmbeddedTextBackend {
    fn backend_type(&self) -> TextBackendType {
        TextBackendType::Embedded
    }

    fn extract(&self, pdf: &PdfSource<'_>) -> Result<String, ExtractionError> {
        let doc = Document::load_mem(pdf.bytes)
            .map_err(|e| ExtractionError::ExtractionFailed(e.to_string()))?;

        let mut chunks = Vec::new();
        for page_number in doc.get_pages().into_keys() {
            match doc.extract_text(&[page_number]) {
                Ok(text) if !text.is_empty() => chunks.push(text),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(
                        "lopdf could not read page {} of {}: {}",
                        page_number,
                        pdf.path.display(),
                        e
                    );
                }
            }
        }

        Ok(chunks.join("\n"))
    }
}
