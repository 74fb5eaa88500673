//! Text backend abstraction.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Errors from text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Available text backends, in their default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextBackendType {
    /// Layout-aware extraction with pdf-extract.
    Layout,
    /// Text operators read directly with lopdf.
    Embedded,
    /// Ghostscript `txtwrite` device.
    Ghostscript,
}

impl TextBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextBackendType::Layout => "pdf-extract",
            TextBackendType::Embedded => "lopdf",
            TextBackendType::Ghostscript => "ghostscript",
        }
    }
}

impl fmt::Display for TextBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A PDF handed to the backends: its path and its bytes, read once.
#[derive(Debug, Clone, Copy)]
pub struct PdfSource<'a> {
    pub path: &'a Path,
    pub bytes: &'a [u8],
}

/// A text extraction backend.
pub trait TextBackend {
    fn backend_type(&self) -> TextBackendType;

    /// Whether the backend can run at all (e.g. its tool is installed).
    fn is_available(&self) -> bool {
        true
    }

    /// Extract the text of every page, pages joined by a newline.
    fn extract(&self, pdf: &PdfSource<'_>) -> Result<String, ExtractionError>;
}
