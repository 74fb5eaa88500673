//! Output file naming.

use std::path::{Path, PathBuf};

/// Replace characters that are not allowed in file names and make sure the
/// name ends in `.pdf`.
pub fn safe_output_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();

    if cleaned.to_lowercase().ends_with(".pdf") {
        cleaned
    } else {
        format!("{}.pdf", cleaned)
    }
}

/// Path for the `index`-th split output: `<stem>_<NN><ext>` next to `base`.
pub fn indexed_output_path(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}_{:02}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{:02}", stem, index),
    };
    base.with_file_name(name)
}
