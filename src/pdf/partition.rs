//! Splitting a list of PDFs into groups that each fit a size limit.
//!
//! The list is only ever cut in half, never reordered: a group that does not
//! fit is split at its midpoint and both halves are partitioned on their own.
//! A single file that does not fit becomes a group by itself.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::compress::{CompressError, SizeCompressor};
use super::merge::{MergeError, Merger};

/// Decides whether a group fits. `label` is unique per call in one
/// partition run and can be used to name scratch files.
pub trait FitProbe<T> {
    type Error;

    fn fits(&mut self, group: &[T], label: &str) -> Result<bool, Self::Error>;
}

impl<T, E, F> FitProbe<T> for F
where
    F: FnMut(&[T], &str) -> Result<bool, E>,
{
    type Error = E;

    fn fits(&mut self, group: &[T], label: &str) -> Result<bool, E> {
        self(group, label)
    }
}

/// Partition `items` into consecutive groups accepted by `probe`.
///
/// Concatenating the returned groups yields `items` again.
pub fn partition<T, P>(items: &[T], probe: &mut P, label: &str) -> Result<Vec<Vec<T>>, P::Error>
where
    T: Clone,
    P: FitProbe<T>,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    if probe.fits(items, label)? || items.len() == 1 {
        return Ok(vec![items.to_vec()]);
    }

    let mid = items.len() / 2;
    let mut groups = partition(&items[..mid], probe, &format!("{}_L", label))?;
    groups.extend(partition(&items[mid..], probe, &format!("{}_R", label))?);
    Ok(groups)
}

/// Errors from probing a group.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Compress(#[from] CompressError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Probes a group by merging it into a scratch file and running it through
/// the size compressor. The scratch file is removed after every probe.
pub struct MergeProbe<'a> {
    merger: &'a Merger,
    compressor: &'a SizeCompressor,
    limit: u64,
    scratch_dir: &'a Path,
}

impl<'a> MergeProbe<'a> {
    pub fn new(
        merger: &'a Merger,
        compressor: &'a SizeCompressor,
        limit: u64,
        scratch_dir: &'a Path,
    ) -> Self {
        Self {
            merger,
            compressor,
            limit,
            scratch_dir,
        }
    }
}

impl FitProbe<PathBuf> for MergeProbe<'_> {
    type Error = ProbeError;

    fn fits(&mut self, group: &[PathBuf], label: &str) -> Result<bool, ProbeError> {
        std::fs::create_dir_all(self.scratch_dir)?;
        let probe = tempfile::Builder::new()
            .prefix(&format!("fit_probe_{}_", label))
            .suffix(".pdf")
            .tempfile_in(self.scratch_dir)?
            .into_temp_path();

        self.merger.merge(group, &probe)?;
        let outcome = self.compressor.enforce_limit(&probe, self.limit)?;
        tracing::debug!(
            label,
            files = group.len(),
            size = outcome.size,
            fits = outcome.within_limit,
            "Probed group"
        );
        Ok(outcome.within_limit)
    }
}
