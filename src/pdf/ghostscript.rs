//! Ghostscript command-line driver.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from running Ghostscript.
#[derive(Debug, Error)]
pub enum GhostscriptError {
    #[error("Ghostscript (gs) not found")]
    NotFound,

    #[error("Ghostscript failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A located Ghostscript binary.
#[derive(Debug, Clone)]
pub struct Ghostscript {
    binary: PathBuf,
}

impl Ghostscript {
    /// Use a specific binary without checking that it exists.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Find Ghostscript: an explicit path if it exists, otherwise the usual
    /// binary names on the search path.
    pub fn locate(explicit: Option<&Path>) -> Option<Self> {
        if let Some(path) = explicit {
            if path.exists() {
                return Some(Self::new(path));
            }
            tracing::warn!(
                "Configured Ghostscript binary {} does not exist, searching PATH",
                path.display()
            );
        }

        let candidates = if cfg!(windows) {
            vec!["gswin64c", "gswin32c", "gs"]
        } else {
            vec!["gs", "/usr/bin/gs", "/usr/local/bin/gs"]
        };

        for candidate in candidates {
            if let Ok(path) = which::which(candidate) {
                tracing::debug!("Found Ghostscript at {}", path.display());
                return Some(Self::new(path));
            }
        }

        None
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Write `inputs` into a single PDF at `output` with the `pdfwrite`
    /// device. `extra_args` go before the output file argument.
    pub fn pdfwrite<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        output: &Path,
        extra_args: &[String],
    ) -> Result<(), GhostscriptError> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.run("pdfwrite", extra_args, output, inputs)
    }

    /// Dump the text of `input` into `output` with the `txtwrite` device.
    pub fn txtwrite(&self, input: &Path, output: &Path) -> Result<(), GhostscriptError> {
        self.run("txtwrite", &[], output, &[input])
    }

    fn run<P: AsRef<Path>>(
        &self,
        device: &str,
        extra_args: &[String],
        output: &Path,
        inputs: &[P],
    ) -> Result<(), GhostscriptError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-q", "-dNOPAUSE", "-dBATCH"])
            .arg(format!("-sDEVICE={}", device))
            .args(extra_args)
            .arg(format!("-sOutputFile={}", output.display()));
        for input in inputs {
            cmd.arg(input.as_ref());
        }

        tracing::debug!(device, output = %output.display(), "Running Ghostscript");

        match cmd.output() {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(GhostscriptError::Failed(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(GhostscriptError::NotFound),
            Err(e) => Err(GhostscriptError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_ignores_missing_explicit_path() {
        let missing = Path::new("/definitely/not/here/gs");
        // Falls back to PATH lookup; must never return the missing path.
        if let Some(gs) = Ghostscript::locate(Some(missing)) {
            assert_ne!(gs.binary(), missing);
        }
    }

    #[test]
    fn test_missing_binary_reports_not_found() {
        let gs = Ghostscript::new("/definitely/not/here/gs");
        let dir = tempfile::TempDir::new().unwrap();
        let err = gs
            .txtwrite(Path::new("in.pdf"), &dir.path().join("out.txt"))
            .unwrap_err();
        assert!(matches!(err, GhostscriptError::NotFound));
    }
}
