//! Ordered fallback chain over text backends.

use std::path::{Path, PathBuf};

use crate::pdf::Ghostscript;

use super::backend::{ExtractionError, PdfSource, TextBackend};
use super::embedded::EmbeddedTextBackend;
use super::layout::LayoutTextBackend;
use super::txtwrite::GhostscriptTextBackend;

/// Text extractor that tries each backend in turn.
pub struct TextExtractor {
    backends: Vec<Box<dyn TextBackend>>,
}

impl TextExtractor {
    /// The default chain: pdf-extract, lopdf, then Ghostscript (skipped when
    /// `gs` is `None`). Ghostscript scratch files go to `scratch_dir`.
    pub fn new(gs: Option<Ghostscript>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self::with_backends(vec![
            Box::new(LayoutTextBackend),
            Box::new(EmbeddedTextBackend),
            Box::new(GhostscriptTextBackend::new(gs, scratch_dir)),
        ])
    }

    pub fn with_backends(backends: Vec<Box<dyn TextBackend>>) -> Self {
        Self { backends }
    }

    pub fn backends(&self) -> impl Iterator<Item = &dyn TextBackend> {
        self.backends.iter().map(|b| b.as_ref())
    }

    /// Extract the text of `path`.
    ///
    /// Backend failures fall through to the next backend. An empty string
    /// comes back when backends ran but found no text. It is an error when
    /// the file cannot be read or every available backend failed.
    pub fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path)?;
        let source = PdfSource {
            path,
            bytes: &bytes,
        };

        let mut any_succeeded = false;
        let mut last_error = None;
        for backend in &self.backends {
            let name = backend.backend_type();
            if !backend.is_available() {
                tracing::debug!("{} not available, skipping", name);
                continue;
            }

            match backend.extract(&source) {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::debug!(
                        backend = %name,
                        chars = text.len(),
                        "Extracted text from {}",
                        path.display()
                    );
                    return Ok(text);
                }
                Ok(_) => {
                    tracing::debug!("{} found no text in {}", name, path.display());
                    any_succeeded = true;
                }
                Err(e) => {
                    tracing::debug!("{} failed on {}: {}", name, path.display(), e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !any_succeeded => Err(e),
            _ => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::TextBackendType;
    use crate::pdf::fixtures::write_pdf;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    enum Behaviour {
        Text(&'static str),
        Fail,
        Unavailable,
    }

    struct FakeBackend {
        behaviour: Behaviour,
        calls: Rc<Cell<usize>>,
    }

    impl FakeBackend {
        fn boxed(behaviour: Behaviour, calls: &Rc<Cell<usize>>) -> Box<dyn TextBackend> {
            Box::new(Self {
                behaviour,
                calls: Rc::clone(calls),
            })
        }
    }

    impl TextBackend for FakeBackend {
        fn backend_type(&self) -> TextBackendType {
            TextBackendType::Layout
        }

        fn is_available(&self) -> bool {
            !matches!(self.behaviour, Behaviour::Unavailable)
        }

        fn extract(&self, _pdf: &PdfSource<'_>) -> Result<String, ExtractionError> {
            self.calls.set(self.calls.get() + 1);
            match self.behaviour {
                Behaviour::Text(text) => Ok(text.to_string()),
                Behaviour::Fail => Err(ExtractionError::ExtractionFailed("nope".to_string())),
                Behaviour::Unavailable => unreachable!("unavailable backends are skipped"),
            }
        }
    }

    fn any_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        path
    }

    #[test]
    fn test_whitespace_only_falls_through() {
        let dir = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let extractor = TextExtractor::with_backends(vec![
            FakeBackend::boxed(Behaviour::Text(" \n\t "), &calls),
            FakeBackend::boxed(Behaviour::Text("second"), &calls),
            FakeBackend::boxed(Behaviour::Text("third"), &calls),
        ]);

        assert_eq!(extractor.extract_text(&any_file(&dir)).unwrap(), "second");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_failures_and_unavailable_backends_are_skipped() {
        let dir = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let extractor = TextExtractor::with_backends(vec![
            FakeBackend::boxed(Behaviour::Fail, &calls),
            FakeBackend::boxed(Behaviour::Unavailable, &calls),
            FakeBackend::boxed(Behaviour::Text("  padded  "), &calls),
        ]);

        // Accepted text is returned as-is, not trimmed.
        assert_eq!(extractor.extract_text(&any_file(&dir)).unwrap(), "  padded  ");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_all_backends_empty_gives_empty_text() {
        let dir = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let extractor = TextExtractor::with_backends(vec![
            FakeBackend::boxed(Behaviour::Fail, &calls),
            FakeBackend::boxed(Behaviour::Text(""), &calls),
        ]);

        assert_eq!(extractor.extract_text(&any_file(&dir)).unwrap(), "");
    }

    #[test]
    fn test_all_backends_failing_is_an_error() {
        let dir = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let extractor = TextExtractor::with_backends(vec![
            FakeBackend::boxed(Behaviour::Fail, &calls),
            FakeBackend::boxed(Behaviour::Unavailable, &calls),
            FakeBackend::boxed(Behaviour::Fail, &calls),
        ]);

        let err = extractor.extract_text(&any_file(&dir)).unwrap_err();
        assert!(matches!(err, ExtractionError::ExtractionFailed(_)));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_no_available_backend_gives_empty_text() {
        let dir = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let extractor =
            TextExtractor::with_backends(vec![FakeBackend::boxed(Behaviour::Unavailable, &calls)]);

        assert_eq!(extractor.extract_text(&any_file(&dir)).unwrap(), "");
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let extractor = TextExtractor::new(None, dir.path());
        assert!(extractor.extract_text(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let extractor = TextExtractor::new(None, dir.path());
        let err = extractor
            .extract_text(&dir.path().join("missing.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[test]
    fn test_default_chain_reads_generated_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.pdf");
        write_pdf(&path, &["Hello alpha"]);

        let extractor = TextExtractor::new(None, dir.path());
        let text = extractor.extract_text(&path).unwrap();
        assert!(text.contains("alpha"), "unexpected text: {:?}", text);
    }

    #[test]
    fn test_default_chain_order() {
        let dir = TempDir::new().unwrap();
        let extractor = TextExtractor::new(None, dir.path());
        let order: Vec<_> = extractor.backends().map(|b| b.backend_type()).collect();
        assert_eq!(
            order,
            [
                TextBackendType::Layout,
                TextBackendType::Embedded,
                TextBackendType::Ghostscript
            ]
        );
    }
}
