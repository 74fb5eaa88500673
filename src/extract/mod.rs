//! PDF text extraction.
//!
//! Text is pulled from a PDF by trying backends in order until one returns
//! non-blank text:
//! - `layout`: pdf-extract, which follows the page layout
//! - `embedded`: lopdf's per-page text operators
//! - `txtwrite`: Ghostscript's `txtwrite` device, via a scratch text file
//!
//! A backend that is unavailable, fails, or returns only whitespace is
//! skipped. If none produces text the result is empty, unless every
//! available backend failed, which is reported as an error.

mod backend;
mod embedded;
mod extractor;
mod layout;
mod txtwrite;

pub use backend::{ExtractionError, PdfSource, TextBackend, TextBackendType};
pub use embedded::EmbeddedTextBackend;
pub use extractor::TextExtractor;
pub use layout::LayoutTextBackend;
pub use txtwrite::GhostscriptTextBackend;
