//! Keyword merge service.
//!
//! Runs the whole job: validate inputs, load keywords, scan, extract text
//! when matching on content, match, merge (splitting by size when needed)
//! and write the report. Separated from UI concerns - emits events for
//! status output and progress tracking.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::{ConfigError, Settings};
use crate::extract::TextExtractor;
use crate::matching::{load_keywords, MatchMode, MatchSet};
use crate::pdf::{partition, Ghostscript, MergeProbe, Merger, SizeCompressor};
use crate::report::{OutputEntry, Report};
use crate::scan::list_pdfs;
use crate::utils::{indexed_output_path, safe_output_name};

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    /// Content extraction started
    ExtractionStarted { total: usize },
    /// Text extracted from one file (may be empty)
    FileExtracted { path: PathBuf, chars: usize },
    /// A file could not be read; it continues with empty text
    ExtractionFailed { path: PathBuf, error: String },
    ExtractionFinished,
    /// Match count for one keyword, in keyword order
    KeywordMatched { keyword: String, count: usize },
    /// No keyword matched anything, nothing is merged
    NothingMatched,
    /// Dry run: the merge that would have happened
    DryRunMerge {
        keyword: Option<String>,
        sources: usize,
        output: PathBuf,
        limit: u64,
    },
    /// Single merge output written within the limit
    Merged {
        sources: usize,
        output: PathBuf,
        size: u64,
    },
    /// Merged output did not fit and is being split
    SplitStarted { groups: usize },
    SplitWritten {
        index: usize,
        output: PathBuf,
        size: u64,
        sources: usize,
        within_limit: bool,
    },
    KeywordMerged {
        keyword: String,
        output: PathBuf,
        sources: usize,
        size: u64,
    },
    /// Two keywords map to the same output file; the later one overwrites
    OutputNameCollision { keyword: String, output: PathBuf },
    ReportWritten { path: PathBuf },
}

/// What to run. Everything else comes from [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    pub input_dir: PathBuf,
    pub keywords: Vec<String>,
    pub keywords_file: Option<PathBuf>,
    pub dry_run: bool,
    /// One output per keyword instead of one merged output.
    pub per_keyword: bool,
    /// Overrides the default report location.
    pub report_path: Option<PathBuf>,
}

/// Result of a finished run.
#[derive(Debug)]
pub struct MergeRun {
    pub report: Report,
    pub report_path: PathBuf,
    /// PDFs written, in the order they were written.
    pub written: Vec<PathBuf>,
}

/// Service for keyword matching and merging.
pub struct KeywordMergeService {
    settings: Settings,
    extractor: TextExtractor,
    merger: Merger,
    compressor: SizeCompressor,
}

impl KeywordMergeService {
    /// Build the default backend chains, using Ghostscript when it is found.
    pub fn new(settings: Settings) -> Self {
        let gs = Ghostscript::locate(settings.ghostscript.as_deref());
        match &gs {
            Some(gs) => tracing::debug!("Using Ghostscript at {}", gs.binary().display()),
            None => tracing::info!("Ghostscript not found; compression is disabled"),
        }

        Self {
            extractor: TextExtractor::new(gs.clone(), settings.tmp_dir.clone()),
            merger: Merger::new(gs.clone()),
            compressor: SizeCompressor::with_ghostscript(gs, settings.tmp_dir.clone()),
            settings,
        }
    }

    pub fn with_components(
        settings: Settings,
        extractor: TextExtractor,
        merger: Merger,
        compressor: SizeCompressor,
    ) -> Self {
        Self {
            settings,
            extractor,
            merger,
            compressor,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the job. The report is written on every path that gets past
    /// input validation.
    pub fn run(
        &self,
        request: &MergeRequest,
        mut on_event: impl FnMut(MergeEvent),
    ) -> anyhow::Result<MergeRun> {
        let settings = &self.settings;

        if !request.input_dir.is_dir() {
            return Err(ConfigError::InputDirNotFound(request.input_dir.clone()).into());
        }
        let limit = settings.size_limit_bytes()?;
        let keywords = load_keywords(&request.keywords, request.keywords_file.as_deref())?;

        let pdfs = list_pdfs(&request.input_dir, settings.recursive)
            .with_context(|| format!("Failed to scan {}", request.input_dir.display()))?;
        if pdfs.is_empty() {
            return Err(ConfigError::NoPdfsFound(request.input_dir.clone()).into());
        }
        tracing::info!(
            pdfs = pdfs.len(),
            keywords = keywords.len(),
            mode = %settings.match_mode,
            "Scanned input"
        );

        let texts = match settings.match_mode {
            MatchMode::Content => self.extract_all(&pdfs, &mut on_event),
            MatchMode::Filename => HashMap::new(),
        };

        let matches = MatchSet::compute(
            &pdfs,
            &keywords,
            settings.match_mode,
            settings.case_sensitive,
            &texts,
        );
        for (keyword, files) in matches.iter() {
            on_event(MergeEvent::KeywordMatched {
                keyword: keyword.to_string(),
                count: files.len(),
            });
        }

        let (report, written) = if request.per_keyword {
            self.merge_per_keyword(request, pdfs.len(), &matches, limit, &mut on_event)?
        } else {
            self.merge_single(request, pdfs.len(), &matches, limit, &mut on_event)?
        };

        let report_path = request
            .report_path
            .clone()
            .unwrap_or_else(|| settings.report_path());
        report
            .write(&report_path)
            .with_context(|| format!("Failed to write report {}", report_path.display()))?;
        on_event(MergeEvent::ReportWritten {
            path: report_path.clone(),
        });

        Ok(MergeRun {
            report,
            report_path,
            written,
        })
    }

    /// Extract text from every PDF once. Failures degrade to empty text.
    fn extract_all(
        &self,
        pdfs: &[PathBuf],
        on_event: &mut dyn FnMut(MergeEvent),
    ) -> HashMap<PathBuf, String> {
        on_event(MergeEvent::ExtractionStarted { total: pdfs.len() });

        let mut texts = HashMap::with_capacity(pdfs.len());
        for pdf in pdfs {
            let text = match self.extractor.extract_text(pdf) {
                Ok(text) => {
                    on_event(MergeEvent::FileExtracted {
                        path: pdf.clone(),
                        chars: text.chars().count(),
                    });
                    text
                }
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", pdf.display(), e);
                    on_event(MergeEvent::ExtractionFailed {
                        path: pdf.clone(),
                        error: e.to_string(),
                    });
                    String::new()
                }
            };
            texts.insert(pdf.clone(), text);
        }

        on_event(MergeEvent::ExtractionFinished);
        texts
    }

    /// Merge every matched file into one output, splitting into indexed
    /// outputs when the merge does not fit even after compression.
    fn merge_single(
        &self,
        request: &MergeRequest,
        total_pdfs: usize,
        matches: &MatchSet,
        limit: u64,
        on_event: &mut dyn FnMut(MergeEvent),
    ) -> anyhow::Result<(Report, Vec<PathBuf>)> {
        let output = self.settings.output_path();
        let mut report = Report::single(
            &request.input_dir,
            total_pdfs,
            self.settings.match_mode,
            matches,
            &output,
            limit,
        );
        let mut written = Vec::new();
        let targets = matches.unique_targets();

        if targets.is_empty() {
            on_event(MergeEvent::NothingMatched);
            return Ok((report, written));
        }
        if request.dry_run {
            on_event(MergeEvent::DryRunMerge {
                keyword: None,
                sources: targets.len(),
                output,
                limit,
            });
            return Ok((report, written));
        }

        self.merger
            .merge(targets, &output)
            .with_context(|| format!("Failed to merge into {}", output.display()))?;
        let outcome = self.compressor.enforce_limit(&output, limit)?;

        if outcome.within_limit {
            report.push_output(OutputEntry::new(&output, outcome.size, targets.len(), true));
            on_event(MergeEvent::Merged {
                sources: targets.len(),
                output: output.clone(),
                size: outcome.size,
            });
            written.push(output);
            return Ok((report, written));
        }

        tracing::info!(
            size = outcome.size,
            limit,
            "Merged output is over the limit, splitting"
        );
        remove_if_exists(&output)?;

        let mut probe = MergeProbe::new(&self.merger, &self.compressor, limit, &self.settings.tmp_dir);
        let groups = partition(targets, &mut probe, "root")?;
        on_event(MergeEvent::SplitStarted {
            groups: groups.len(),
        });

        for (i, group) in groups.iter().enumerate() {
            let index = i + 1;
            let path = indexed_output_path(&output, index);
            self.merger
                .merge(group, &path)
                .with_context(|| format!("Failed to merge into {}", path.display()))?;
            let outcome = self.compressor.enforce_limit(&path, limit)?;

            report.push_output(OutputEntry::new(
                &path,
                outcome.size,
                group.len(),
                outcome.within_limit,
            ));
            on_event(MergeEvent::SplitWritten {
                index,
                output: path.clone(),
                size: outcome.size,
                sources: group.len(),
                within_limit: outcome.within_limit,
            });
            written.push(path);
        }

        Ok((report, written))
    }

    /// One output per keyword with matches. No size limit handling.
    fn merge_per_keyword(
        &self,
        request: &MergeRequest,
        total_pdfs: usize,
        matches: &MatchSet,
        limit: u64,
        on_event: &mut dyn FnMut(MergeEvent),
    ) -> anyhow::Result<(Report, Vec<PathBuf>)> {
        let report = Report::per_keyword(
            &request.input_dir,
            total_pdfs,
            self.settings.match_mode,
            matches,
            limit,
        );
        let mut written = Vec::new();

        if matches.is_empty() {
            on_event(MergeEvent::NothingMatched);
            return Ok((report, written));
        }

        let mut used = HashSet::new();
        for (keyword, files) in matches.iter() {
            if files.is_empty() {
                continue;
            }

            let output = self.settings.output_dir.join(safe_output_name(keyword));
            if !used.insert(output.clone()) {
                tracing::warn!("Output name collision for keyword {:?}", keyword);
                on_event(MergeEvent::OutputNameCollision {
                    keyword: keyword.to_string(),
                    output: output.clone(),
                });
            }

            if request.dry_run {
                on_event(MergeEvent::DryRunMerge {
                    keyword: Some(keyword.to_string()),
                    sources: files.len(),
                    output,
                    limit,
                });
                continue;
            }

            self.merger
                .merge(files, &output)
                .with_context(|| format!("Failed to merge into {}", output.display()))?;
            let size = fs::metadata(&output)?.len();
            on_event(MergeEvent::KeywordMerged {
                keyword: keyword.to_string(),
                output: output.clone(),
                sources: files.len(),
                size,
            });
            written.push(output);
        }

        Ok((report, written))
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
