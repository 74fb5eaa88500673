//! Extraction through Ghostscript's `txtwrite` device.

use std::path::PathBuf;

use crate::pdf::Ghostscript;

use super::backend::{ExtractionError, PdfSource, TextBackend, TextBackendType};

/// Ghostscript backend. Writes the text to a scratch file in `scratch_dir`,
/// reads it back, and removes the file whatever the outcome.
#[derive(Debug, Clone)]
pub struct GhostscriptTextBackend {
    gs: Option<Ghostscript>,
    scratch_dir: PathBuf,
}

impl GhostscriptTextBackend {
    pub fn new(gs: Option<Ghostscript>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            gs,
            scratch_dir: scratch_dir.into(),
        }
    }
}

impl TextBackend for GhostscriptTextBackend {
    fn backend_type(&self) -> TextBackendType {
        TextBackendType::Ghostscript
    }

    fn is_available(&self) -> bool {
        self.gs.is_some()
    }

    fn extract(&self, pdf: &PdfSource<'_>) -> Result<String, ExtractionError> {
        let gs = self.gs.as_ref().ok_or_else(|| {
            ExtractionError::BackendNotAvailable("Ghostscript (gs) not found".to_string())
        })?;

        std::fs::create_dir_all(&self.scratch_dir)?;
        let txt_path = tempfile::Builder::new()
            .prefix("gs_text_")
            .suffix(".txt")
            .tempfile_in(&self.scratch_dir)?
            .into_temp_path();

        gs.txtwrite(pdf.path, &txt_path)
            .map_err(|e| ExtractionError::ExtractionFailed(e.to_string()))?;

        let bytes = std::fs::read(&txt_path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
