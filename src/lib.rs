//! pdf-keyword-merge - find PDFs by keyword and merge the matches.
//!
//! Scans a directory for PDFs whose file name (or extracted text) contains
//! one of the given keywords, then merges the matched files into one output
//! PDF. When the merged file is larger than the configured size limit it is
//! recompressed with Ghostscript, and if it still does not fit, the matched
//! files are split into several indexed outputs that each fit on their own.

pub mod cli;
pub mod config;
pub mod extract;
pub mod matching;
pub mod pdf;
pub mod report;
pub mod scan;
pub mod services;
pub mod utils;
