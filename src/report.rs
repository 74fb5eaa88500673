//! JSON run report.

use std::fs;
use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::matching::{MatchMode, MatchSet};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Matches for one keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordEntry {
    pub match_count: usize,
    pub matched_files: Vec<String>,
}

/// Keyword entries, serialized as a JSON object in keyword order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordReport(Vec<(String, KeywordEntry)>);

impl KeywordReport {
    pub fn from_matches(matches: &MatchSet) -> Self {
        Self(
            matches
                .iter()
                .map(|(keyword, files)| {
                    (
                        keyword.to_string(),
                        KeywordEntry {
                            match_count: files.len(),
                            matched_files: files.iter().map(|p| display_path(p)).collect(),
                        },
                    )
                })
                .collect(),
        )
    }

    pub fn get(&self, keyword: &str) -> Option<&KeywordEntry> {
        self.0.iter().find(|(kw, _)| kw == keyword).map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for KeywordReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (keyword, entry) in &self.0 {
            map.serialize_entry(keyword, entry)?;
        }
        map.end()
    }
}

/// One written output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputEntry {
    pub path: String,
    pub size_bytes: u64,
    pub source_pdf_count: usize,
    pub within_limit: bool,
}

impl OutputEntry {
    pub fn new(path: &Path, size_bytes: u64, source_pdf_count: usize, within_limit: bool) -> Self {
        Self {
            path: display_path(path),
            size_bytes,
            source_pdf_count,
            within_limit,
        }
    }
}

/// The report written at the end of every run.
///
/// `merged_output`, `merged_target_count` and `outputs` are only present in
/// single merge mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub input_dir: String,
    pub total_pdfs: usize,
    pub match_mode: MatchMode,
    pub keywords: KeywordReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_target_count: Option<usize>,
    pub size_limit_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<OutputEntry>>,
}

impl Report {
    /// Report for single merge mode, with no outputs yet.
    pub fn single(
        input_dir: &Path,
        total_pdfs: usize,
        match_mode: MatchMode,
        matches: &MatchSet,
        merged_output: &Path,
        size_limit_bytes: u64,
    ) -> Self {
        Self {
            input_dir: display_path(input_dir),
            total_pdfs,
            match_mode,
            keywords: KeywordReport::from_matches(matches),
            merged_output: Some(display_path(merged_output)),
            merged_target_count: Some(matches.unique_targets().len()),
            size_limit_bytes,
            outputs: Some(Vec::new()),
        }
    }

    /// Report for per-keyword mode.
    pub fn per_keyword(
        input_dir: &Path,
        total_pdfs: usize,
        match_mode: MatchMode,
        matches: &MatchSet,
        size_limit_bytes: u64,
    ) -> Self {
        Self {
            input_dir: display_path(input_dir),
            total_pdfs,
            match_mode,
            keywords: KeywordReport::from_matches(matches),
            merged_output: None,
            merged_target_count: None,
            size_limit_bytes,
            outputs: None,
        }
    }

    /// Record an output file. Ignored in per-keyword mode.
    pub fn push_output(&mut self, entry: OutputEntry) {
        if let Some(outputs) = self.outputs.as_mut() {
            outputs.push(entry);
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty-printed JSON, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
