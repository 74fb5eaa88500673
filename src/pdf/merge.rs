//! PDF merging.
//!
//! Pages are concatenated in input order. lopdf does the work in-process;
//! when it cannot handle an input (unparseable or encrypted file) the merge
//! is retried with Ghostscript's `pdfwrite` device.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use thiserror::Error;

use super::ghostscript::{Ghostscript, GhostscriptError};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Errors that can occur while merging.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("No input PDFs to merge")]
    NoInputs,

    #[error("No merge backend available")]
    NoBackend,

    #[error("Failed to load {}: {}", .path.display(), .source)]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("Encrypted PDF not supported: {}", .0.display())]
    Encrypted(PathBuf),

    #[error("PDF library error: {0}")]
    Library(#[from] lopdf::Error),

    #[error(transparent)]
    Tool(#[from] GhostscriptError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A way of concatenating PDFs into one file.
pub trait MergeBackend {
    /// Short name used in logs and tool listings.
    fn name(&self) -> &'static str;

    /// Write all pages of `inputs`, in order, to `output`.
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError>;
}

/// In-process merge with lopdf.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfMerger;

impl MergeBackend for LopdfMerger {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
        let mut document = concatenate(inputs)?;
        document.save(output)?;
        Ok(())
    }
}

/// Merge by running Ghostscript's `pdfwrite` device over all inputs.
#[derive(Debug, Clone)]
pub struct GhostscriptMerger {
    gs: Ghostscript,
}

impl GhostscriptMerger {
    pub fn new(gs: Ghostscript) -> Self {
        Self { gs }
    }
}

impl MergeBackend for GhostscriptMerger {
    fn name(&self) -> &'static str {
        "ghostscript"
    }

    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
        self.gs.pdfwrite(inputs, output, &[])?;
        Ok(())
    }
}

/// Ordered chain of merge backends; the first one that succeeds wins.
pub struct Merger {
    backends: Vec<Box<dyn MergeBackend>>,
}

impl Merger {
    /// lopdf first, then Ghostscript when it is installed.
    pub fn new(gs: Option<Ghostscript>) -> Self {
        let mut backends: Vec<Box<dyn MergeBackend>> = vec![Box::new(LopdfMerger)];
        if let Some(gs) = gs {
            backends.push(Box::new(GhostscriptMerger::new(gs)));
        }
        Self { backends }
    }

    pub fn with_backends(backends: Vec<Box<dyn MergeBackend>>) -> Self {
        Self { backends }
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Merge `inputs` into `output`, creating parent directories as needed.
    ///
    /// Returns the last backend's error if every backend fails.
    pub fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
        if inputs.is_empty() {
            return Err(MergeError::NoInputs);
        }
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut last_error = None;
        for backend in &self.backends {
            match backend.merge(inputs, output) {
                Ok(()) => {
                    tracing::debug!(
                        backend = backend.name(),
                        inputs = inputs.len(),
                        output = %output.display(),
                        "Merged PDFs"
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("{} merge failed: {}", backend.name(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(MergeError::NoBackend))
    }
}

/// Build one document holding every page of `inputs` in order.
fn concatenate(inputs: &[PathBuf]) -> Result<Document, MergeError> {
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for path in inputs {
        let mut doc = Document::load(path).map_err(|source| MergeError::Load {
            path: path.clone(),
            source,
        })?;
        if doc.is_encrypted() {
            return Err(MergeError::Encrypted(path.clone()));
        }

        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for page_id in doc.get_pages().into_values() {
            pages.push((page_id, page_with_inherited_attributes(&doc, page_id)?));
        }

        for (object_id, object) in doc.objects {
            match object.type_name().unwrap_or("") {
                "Catalog" | "Pages" | "Page" | "Outlines" | "Outline" => {}
                _ => {
                    objects.insert(object_id, object);
                }
            }
        }
    }

    let mut document = Document::with_version("1.5");
    document.objects.extend(objects);
    document.max_id = max_id;

    let pages_id = document.new_object_id();
    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    let count = pages.len() as i64;

    for (page_id, mut page) in pages {
        page.set("Parent", pages_id);
        document.objects.insert(page_id, Object::Dictionary(page));
    }
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    document.renumber_objects();
    document.compress();
    Ok(document)
}

/// Clone a page dictionary, copying in any inheritable attribute it only
/// gets from an ancestor. The ancestors are dropped from the merged tree.
fn page_with_inherited_attributes(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Dictionary, MergeError> {
    let mut page = doc.get_object(page_id)?.as_dict()?.clone();
    let mut parent = page.get(b"Parent").and_then(|p| p.as_reference()).ok();

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let Some(parent_id) = parent else {
            break;
        };
        let Ok(node) = doc.get_object(parent_id).and_then(|o| o.as_dict()) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }

    Ok(page)
}
