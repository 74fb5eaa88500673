//! PDF discovery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// List every `*.pdf` file under `dir`, sorted by path.
///
/// The extension check is case-sensitive. With `recursive`, subdirectories
/// are scanned too (symlinked directories are not followed); a subdirectory
/// that cannot be read is skipped with a warning. Failing to read `dir`
/// itself is an error.
pub fn list_pdfs(dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    collect(dir, recursive, &mut pdfs)?;
    pdfs.sort();
    Ok(pdfs)
}

fn collect(dir: &Path, recursive: bool, pdfs: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if recursive {
                if let Err(e) = collect(&path, recursive, pdfs) {
                    tracing::warn!("Skipping unreadable directory {}: {}", path.display(), e);
                }
            }
            continue;
        }

        // Follows file symlinks; dangling links fail is_file and are dropped.
        if path.extension().is_some_and(|ext| ext == "pdf") && path.is_file() {
            pdfs.push(path);
        }
    }
    Ok(())
}
