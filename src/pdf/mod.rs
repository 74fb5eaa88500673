//! PDF assembly: merging, size-limited recompression and split planning.
//!
//! - `ghostscript`: locating and driving the Ghostscript binary
//! - `merge`: page concatenation with lopdf, Ghostscript as fallback
//! - `compress`: recompression attempts that bring a file under a byte limit
//! - `partition`: recursive halving of a file list into groups that fit

mod compress;
mod ghostscript;
mod merge;
mod partition;

#[cfg(test)]
pub(crate) mod fixtures;

pub use compress::{
    CompressError, CompressionAttempt, LimitOutcome, Preset, Recompressor, SizeCompressor,
    COMPRESSION_ATTEMPTS,
};
pub use ghostscript::{Ghostscript, GhostscriptError};
pub use merge::{GhostscriptMerger, LopdfMerger, MergeBackend, MergeError, Merger};
pub use partition::{partition, FitProbe, MergeProbe, ProbeError};
