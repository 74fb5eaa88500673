//! The `merge` command.

use std::path::PathBuf;

use clap::Args;
use indicatif::ProgressBar;

use crate::config::Settings;
use crate::matching::MatchMode;
use crate::services::{KeywordMergeService, MergeEvent, MergeRequest};
use crate::utils::{format_size, print_status, Status};

use super::super::helpers::progress_bar;

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Directory to scan for PDFs
    #[arg(long, env = "PDF_KEYWORD_MERGE_INPUT_DIR")]
    input_dir: PathBuf,

    /// Keywords to match (substring, not whole word)
    #[arg(long, num_args = 0.., env = "PDF_KEYWORD_MERGE_KEYWORDS")]
    keywords: Vec<String>,

    /// File with one keyword per line
    #[arg(long, env = "PDF_KEYWORD_MERGE_KEYWORDS_FILE")]
    keywords_file: Option<PathBuf>,

    /// Output directory [default: output/pdf]
    #[arg(long, env = "PDF_KEYWORD_MERGE_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Output file name [default: merged_keywords.pdf]
    #[arg(long, env = "PDF_KEYWORD_MERGE_OUTPUT_NAME")]
    output_name: Option<String>,

    /// Directory for scratch files and the report [default: tmp/pdfs]
    #[arg(long, env = "PDF_KEYWORD_MERGE_TMP_DIR")]
    tmp_dir: Option<PathBuf>,

    /// Maximum size of each output in MB [default: 2.0]
    #[arg(long, allow_hyphen_values = true, env = "PDF_KEYWORD_MERGE_SIZE_LIMIT_MB")]
    size_limit_mb: Option<f64>,

    /// Only scan the top level of the input directory
    #[arg(long, env = "PDF_KEYWORD_MERGE_NO_RECURSIVE")]
    no_recursive: bool,

    /// Match keywords case-sensitively
    #[arg(long, env = "PDF_KEYWORD_MERGE_CASE_SENSITIVE")]
    case_sensitive: bool,

    /// Print what would be merged without writing any PDF
    #[arg(long, env = "PDF_KEYWORD_MERGE_DRY_RUN")]
    dry_run: bool,

    /// Match against file names or extracted text [default: filename]
    #[arg(long, value_enum, env = "PDF_KEYWORD_MERGE_MATCH_MODE")]
    match_mode: Option<MatchMode>,

    /// Write one output per keyword instead of a single merged file
    #[arg(long, env = "PDF_KEYWORD_MERGE_PER_KEYWORD")]
    per_keyword: bool,

    /// Report path [default: <tmp-dir>/keyword_merge_report.json]
    #[arg(long, env = "PDF_KEYWORD_MERGE_REPORT")]
    report: Option<PathBuf>,

    /// Path to the Ghostscript binary (searched on PATH otherwise)
    #[arg(long, env = "PDF_KEYWORD_MERGE_GHOSTSCRIPT")]
    ghostscript: Option<PathBuf>,
}

impl MergeArgs {
    /// Apply command-line (and environment) overrides on top of `settings`.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref dir) = self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(ref name) = self.output_name {
            settings.output_name = name.clone();
        }
        if let Some(ref dir) = self.tmp_dir {
            settings.tmp_dir = dir.clone();
        }
        if let Some(limit) = self.size_limit_mb {
            settings.size_limit_mb = limit;
        }
        if let Some(mode) = self.match_mode {
            settings.match_mode = mode;
        }
        if self.no_recursive {
            settings.recursive = false;
        }
        if self.case_sensitive {
            settings.case_sensitive = true;
        }
        if let Some(ref gs) = self.ghostscript {
            settings.ghostscript = Some(gs.clone());
        }
    }

    pub fn to_request(&self) -> MergeRequest {
        MergeRequest {
            input_dir: self.input_dir.clone(),
            keywords: self.keywords.clone(),
            keywords_file: self.keywords_file.clone(),
            dry_run: self.dry_run,
            per_keyword: self.per_keyword,
            report_path: self.report.clone(),
        }
    }
}

/// Merge matched PDFs.
pub fn cmd_merge(mut settings: Settings, args: MergeArgs) -> anyhow::Result<()> {
    args.apply_to_settings(&mut settings);
    let request = args.to_request();

    let service = KeywordMergeService::new(settings);
    let mut renderer = EventRenderer::default();
    service.run(&request, |event| renderer.render(event))?;
    Ok(())
}

/// Turns service events into status lines.
#[derive(Default)]
struct EventRenderer {
    progress: Option<ProgressBar>,
}

impl EventRenderer {
    fn render(&mut self, event: MergeEvent) {
        match event {
            MergeEvent::ExtractionStarted { total } => {
                print_status(Status::Info, format!("Extracting text from {} PDFs", total));
                self.progress = Some(progress_bar(total, "Extracting text..."));
            }
            MergeEvent::FileExtracted { .. } => {
                if let Some(ref progress) = self.progress {
                    progress.inc(1);
                }
            }
            MergeEvent::ExtractionFailed { path, error } => {
                let message = format!("Failed to read {}: {}", path.display(), error);
                match self.progress {
                    Some(ref progress) => {
                        progress.suspend(|| print_status(Status::Warn, &message));
                        progress.inc(1);
                    }
                    None => print_status(Status::Warn, &message),
                }
            }
            MergeEvent::ExtractionFinished => {
                if let Some(progress) = self.progress.take() {
                    progress.finish_and_clear();
                }
            }
            MergeEvent::KeywordMatched { keyword, count: 0 } => {
                print_status(Status::Info, format!("No matches for keyword: {}", keyword));
            }
            MergeEvent::KeywordMatched { keyword, count } => {
                print_status(Status::Info, format!("{}: {} matches", keyword, count));
            }
            MergeEvent::NothingMatched => {
                print_status(
                    Status::Info,
                    "No matched PDFs across all keywords. Skip merge.",
                );
            }
            MergeEvent::DryRunMerge {
                keyword: None,
                sources,
                output,
                limit,
            } => {
                print_status(
                    Status::DryRun,
                    format!(
                        "Merge {} unique files -> {} (limit: {} bytes)",
                        sources,
                        output.display(),
                        limit
                    ),
                );
            }
            MergeEvent::DryRunMerge {
                keyword: Some(keyword),
                sources,
                output,
                ..
            } => {
                print_status(
                    Status::DryRun,
                    format!("{}: merge {} files -> {}", keyword, sources, output.display()),
                );
            }
            MergeEvent::Merged {
                sources,
                output,
                size,
            } => {
                print_status(
                    Status::Ok,
                    format!(
                        "Merged {} unique files -> {} ({})",
                        sources,
                        output.display(),
                        format_size(size)
                    ),
                );
            }
            MergeEvent::SplitStarted { groups } => {
                print_status(
                    Status::Info,
                    format!(
                        "Size limit exceeded. Split into {} files with index suffix.",
                        groups
                    ),
                );
            }
            MergeEvent::SplitWritten {
                index,
                output,
                size,
                sources,
                within_limit,
            } => {
                let status = if within_limit { Status::Ok } else { Status::Warn };
                print_status(
                    status,
                    format!(
                        "Split file {}: {} ({}, sources={})",
                        index,
                        output.display(),
                        format_size(size),
                        sources
                    ),
                );
            }
            MergeEvent::KeywordMerged {
                keyword,
                output,
                sources,
                size,
            } => {
                print_status(
                    Status::Ok,
                    format!(
                        "{}: merged {} files -> {} ({})",
                        keyword,
                        sources,
                        output.display(),
                        format_size(size)
                    ),
                );
            }
            MergeEvent::OutputNameCollision { keyword, output } => {
                print_status(
                    Status::Warn,
                    format!(
                        "Keyword {:?} writes to {}, which an earlier keyword also uses",
                        keyword,
                        output.display()
                    ),
                );
            }
            MergeEvent::ReportWritten { path } => {
                print_status(Status::Ok, format!("Wrote report: {}", path.display()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: MergeArgs,
    }

    fn parse(args: &[&str]) -> MergeArgs {
        let mut argv = vec!["merge"];
        argv.extend_from_slice(args);
        Wrapper::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn test_cli_overrides_settings() {
        let args = parse(&[
            "--input-dir",
            "in",
            "--output-dir",
            "merged",
            "--output-name",
            "bundle",
            "--size-limit-mb",
            "0.5",
            "--no-recursive",
            "--case-sensitive",
            "--match-mode",
            "content",
            "--ghostscript",
            "/opt/gs/bin/gs",
        ]);

        let mut settings = Settings::default();
        args.apply_to_settings(&mut settings);

        assert_eq!(settings.output_dir, PathBuf::from("merged"));
        assert_eq!(settings.output_name, "bundle");
        assert_eq!(settings.size_limit_mb, 0.5);
        assert!(!settings.recursive);
        assert!(settings.case_sensitive);
        assert_eq!(settings.match_mode, MatchMode::Content);
        assert_eq!(settings.ghostscript, Some(PathBuf::from("/opt/gs/bin/gs")));
        assert_eq!(settings.tmp_dir, PathBuf::from("tmp/pdfs"));
    }

    #[test]
    fn test_absent_flags_keep_config_values() {
        let args = parse(&["--input-dir", "in"]);
        let mut settings = Settings {
            recursive: false,
            size_limit_mb: 9.0,
            ..Settings::default()
        };
        args.apply_to_settings(&mut settings);

        assert!(!settings.recursive);
        assert_eq!(settings.size_limit_mb, 9.0);
    }

    #[test]
    fn test_negative_size_limit_parses() {
        let args = parse(&["--input-dir", "in", "--size-limit-mb", "-1"]);
        let mut settings = Settings::default();
        args.apply_to_settings(&mut settings);
        assert!(settings.size_limit_bytes().is_err());
    }

    #[test]
    fn test_request_fields() {
        let args = parse(&[
            "--input-dir",
            "in",
            "--keywords-file",
            "kw.txt",
            "--per-keyword",
            "--report",
            "r.json",
        ]);
        let request = args.to_request();
        assert_eq!(request.keywords_file, Some(PathBuf::from("kw.txt")));
        assert!(request.per_keyword);
        assert_eq!(request.report_path, Some(PathBuf::from("r.json")));
        assert!(request.keywords.is_empty());
    }
}
