//! Size-limited recompression.
//!
//! An oversized PDF is rewritten with a fixed list of Ghostscript quality
//! presets and image resolutions, most aggressive first. The first candidate
//! that fits the limit replaces the original. If none fits, the smallest
//! candidate replaces the original as long as it is smaller than it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use thiserror::Error;

use super::ghostscript::{Ghostscript, GhostscriptError};

/// Ghostscript `-dPDFSETTINGS` quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Lowest quality, smallest output.
    Screen,
    /// Medium quality.
    Ebook,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Screen => "screen",
            Preset::Ebook => "ebook",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recompression pass: a quality preset and the resolution images are
/// downsampled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressionAttempt {
    pub preset: Preset,
    pub dpi: u32,
}

impl CompressionAttempt {
    pub const fn new(preset: Preset, dpi: u32) -> Self {
        Self { preset, dpi }
    }

    /// Ghostscript flags for this attempt.
    pub fn ghostscript_args(&self) -> Vec<String> {
        vec![
            "-dCompatibilityLevel=1.4".to_string(),
            format!("-dPDFSETTINGS=/{}", self.preset),
            "-dDetectDuplicateImages=true".to_string(),
            "-dCompressFonts=true".to_string(),
            "-dSubsetFonts=true".to_string(),
            "-dDownsampleColorImages=true".to_string(),
            "-dDownsampleGrayImages=true".to_string(),
            "-dDownsampleMonoImages=true".to_string(),
            format!("-dColorImageResolution={}", self.dpi),
            format!("-dGrayImageResolution={}", self.dpi),
            format!("-dMonoImageResolution={}", self.dpi),
        ]
    }
}

impl fmt::Display for CompressionAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}dpi", self.preset, self.dpi)
    }
}

/// Attempts in the order they are tried.
pub const COMPRESSION_ATTEMPTS: [CompressionAttempt; 6] = [
    CompressionAttempt::new(Preset::Screen, 110),
    CompressionAttempt::new(Preset::Screen, 96),
    CompressionAttempt::new(Preset::Screen, 72),
    CompressionAttempt::new(Preset::Ebook, 110),
    CompressionAttempt::new(Preset::Ebook, 96),
    CompressionAttempt::new(Preset::Ebook, 72),
];

/// Errors from enforcing a size limit.
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can rewrite a PDF with a given compression attempt.
pub trait Recompressor {
    fn recompress(
        &self,
        input: &Path,
        output: &Path,
        attempt: CompressionAttempt,
    ) -> Result<(), GhostscriptError>;
}

impl Recompressor for Ghostscript {
    fn recompress(
        &self,
        input: &Path,
        output: &Path,
        attempt: CompressionAttempt,
    ) -> Result<(), GhostscriptError> {
        self.pdfwrite(&[input], output, &attempt.ghostscript_args())
    }
}

/// Result of [`SizeCompressor::enforce_limit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOutcome {
    pub within_limit: bool,
    /// Size of the file at the original path afterwards.
    pub size: u64,
}

/// Brings PDFs under a byte limit by recompressing them.
pub struct SizeCompressor {
    tool: Option<Box<dyn Recompressor>>,
    scratch_dir: PathBuf,
}

impl SizeCompressor {
    /// `tool` is `None` when no recompression tool is installed; oversized
    /// files are then reported as not fitting and left untouched.
    /// Candidates are written to `scratch_dir`.
    pub fn new(tool: Option<Box<dyn Recompressor>>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn with_ghostscript(gs: Option<Ghostscript>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            gs.map(|gs| Box::new(gs) as Box<dyn Recompressor>),
            scratch_dir,
        )
    }

    pub fn is_available(&self) -> bool {
        self.tool.is_some()
    }

    /// Make `path` fit within `limit` bytes if possible.
    ///
    /// Stops at the first attempt that fits. Every candidate that is not
    /// adopted is deleted before returning, on all paths.
    pub fn enforce_limit(&self, path: &Path, limit: u64) -> Result<LimitOutcome, CompressError> {
        let original_size = fs::metadata(path)?.len();
        if original_size <= limit {
            return Ok(LimitOutcome {
                within_limit: true,
                size: original_size,
            });
        }

        let Some(tool) = &self.tool else {
            tracing::debug!(
                "No compression tool; {} stays at {} bytes",
                path.display(),
                original_size
            );
            return Ok(LimitOutcome {
                within_limit: false,
                size: original_size,
            });
        };

        fs::create_dir_all(&self.scratch_dir)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Smallest candidate so far that beats the original.
        let mut smallest: Option<(TempPath, u64)> = None;

        for attempt in COMPRESSION_ATTEMPTS {
            let candidate = tempfile::Builder::new()
                .prefix(&format!("compressed_{}_{}_", attempt.preset, attempt.dpi))
                .suffix(&format!("_{}", file_name))
                .tempfile_in(&self.scratch_dir)?
                .into_temp_path();

            if let Err(e) = tool.recompress(path, &candidate, attempt) {
                tracing::warn!("Compression attempt {} failed: {}", attempt, e);
                continue;
            }

            let size = fs::metadata(&candidate)?.len();
            tracing::debug!(%attempt, size, limit, "Compression attempt finished");

            if size <= limit {
                adopt_candidate(candidate, path)?;
                return Ok(LimitOutcome {
                    within_limit: true,
                    size: fs::metadata(path)?.len(),
                });
            }

            let best = smallest.as_ref().map_or(original_size, |(_, s)| *s);
            if size < best {
                smallest = Some((candidate, size));
            }
        }

        if let Some((candidate, _)) = smallest {
            adopt_candidate(candidate, path)?;
        }
        let size = fs::metadata(path)?.len();
        Ok(LimitOutcome {
            within_limit: size <= limit,
            size,
        })
    }
}

/// Move a candidate over `dest`. Falls back to copying when the scratch
/// directory is on another filesystem; the temp path then removes itself.
fn adopt_candidate(candidate: TempPath, dest: &Path) -> Result<(), CompressError> {
    if let Err(err) = candidate.persist(dest) {
        tracing::debug!("Rename failed ({}), copying candidate instead", err.error);
        fs::copy(&err.path, dest)?;
    }
    Ok(())
}
