//! Configuration: built-in defaults, an optional config file, and
//! command-line/environment overrides layered on top.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::matching::MatchMode;
use crate::utils::{mb_to_bytes, safe_output_name};

/// Default output directory for merged PDFs.
pub const DEFAULT_OUTPUT_DIR: &str = "output/pdf";
/// Default file name of the merged PDF.
pub const DEFAULT_OUTPUT_NAME: &str = "merged_keywords.pdf";
/// Default directory for scratch files and the report.
pub const DEFAULT_TMP_DIR: &str = "tmp/pdfs";
/// Default size limit in MB.
pub const DEFAULT_SIZE_LIMIT_MB: f64 = 2.0;
/// File name of the JSON report inside the temp directory.
pub const REPORT_FILENAME: &str = "keyword_merge_report.json";

const CONFIG_BASENAME: &str = "pdf-keyword-merge";
const CONFIG_EXTENSIONS: [&str; 2] = ["toml", "json"];

/// Configuration errors. All of them abort the run before any output.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Input directory not found: {}", .0.display())]
    InputDirNotFound(PathBuf),

    #[error("Keywords file not found: {}", .0.display())]
    KeywordsFileNotFound(PathBuf),

    #[error("No keywords provided. Use --keywords or --keywords-file.")]
    NoKeywords,

    #[error("No PDF files found under: {}", .0.display())]
    NoPdfsFound(PathBuf),

    #[error("--size-limit-mb must be greater than 0 (got {0})")]
    InvalidSizeLimit(f64),

    #[error("Failed to read config file {}: {}", .path.display(), .source)]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {}", .path.display(), .message)]
    ParseConfig { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Values read from a config file. Everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub output_dir: Option<String>,
    pub output_name: Option<String>,
    pub tmp_dir: Option<String>,
    pub size_limit_mb: Option<f64>,
    pub match_mode: Option<MatchMode>,
    pub recursive: Option<bool>,
    pub case_sensitive: Option<bool>,
    /// Path to the Ghostscript binary.
    pub ghostscript: Option<String>,

    /// Where this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific file. TOML or JSON, by extension.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_error = |message: String| ConfigError::ParseConfig {
            path: path.to_path_buf(),
            message,
        };

        let mut config: Config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string()))?
            }
            _ => toml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load the explicit config file if given, else the first discovered one,
    /// else an empty config.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        match discover_config() {
            Some(path) => {
                tracing::debug!("Using config file {}", path.display());
                Self::load_from_path(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Directory relative paths in this config are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Expand `~` and resolve relative paths against `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply every value present in this config to `settings`.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        let base_dir = self.base_dir();

        if let Some(ref dir) = self.output_dir {
            settings.output_dir = self.resolve_path(dir, &base_dir);
        }
        if let Some(ref name) = self.output_name {
            settings.output_name = name.clone();
        }
        if let Some(ref dir) = self.tmp_dir {
            settings.tmp_dir = self.resolve_path(dir, &base_dir);
        }
        if let Some(limit) = self.size_limit_mb {
            settings.size_limit_mb = limit;
        }
        if let Some(mode) = self.match_mode {
            settings.match_mode = mode;
        }
        if let Some(recursive) = self.recursive {
            settings.recursive = recursive;
        }
        if let Some(case_sensitive) = self.case_sensitive {
            settings.case_sensitive = case_sensitive;
        }
        if let Some(ref gs) = self.ghostscript {
            settings.ghostscript = Some(self.resolve_path(gs, &base_dir));
        }
    }
}

/// Look for `pdf-keyword-merge.{toml,json}` in the working directory, then
/// `config.{toml,json}` in the user config directory.
fn discover_config() -> Option<PathBuf> {
    let local = CONFIG_EXTENSIONS
        .iter()
        .map(|ext| PathBuf::from(format!("{}.{}", CONFIG_BASENAME, ext)));
    let user = dirs::config_dir()
        .map(|dir| dir.join(CONFIG_BASENAME))
        .into_iter()
        .flat_map(|dir| {
            CONFIG_EXTENSIONS
                .iter()
                .map(move |ext| dir.join(format!("config.{}", ext)))
        });

    local.chain(user).find(|path| path.is_file())
}

/// Resolved settings for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory merged PDFs are written to.
    pub output_dir: PathBuf,
    /// Requested output file name (sanitised by [`Settings::output_path`]).
    pub output_name: String,
    /// Directory for scratch files and the report.
    pub tmp_dir: PathBuf,
    /// Maximum output size in MB (1 MB = 1024 * 1024 bytes).
    pub size_limit_mb: f64,
    pub match_mode: MatchMode,
    /// Scan subdirectories of the input directory.
    pub recursive: bool,
    pub case_sensitive: bool,
    /// Explicit Ghostscript binary; searched on PATH when unset.
    pub ghostscript: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
            size_limit_mb: DEFAULT_SIZE_LIMIT_MB,
            match_mode: MatchMode::default(),
            recursive: true,
            case_sensitive: false,
            ghostscript: None,
        }
    }
}

impl Settings {
    /// Defaults with the given config file applied.
    pub fn from_config(config: &Config) -> Self {
        let mut settings = Self::default();
        config.apply_to_settings(&mut settings);
        settings
    }

    /// Size limit in bytes. Fails when the limit rounds down to zero bytes.
    pub fn size_limit_bytes(&self) -> Result<u64, ConfigError> {
        match mb_to_bytes(self.size_limit_mb) {
            0 => Err(ConfigError::InvalidSizeLimit(self.size_limit_mb)),
            bytes => Ok(bytes),
        }
    }

    /// Path of the single merged output file.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(safe_output_name(&self.output_name))
    }

    /// Default location of the JSON report.
    pub fn report_path(&self) -> PathBuf {
        self.tmp_dir.join(REPORT_FILENAME)
    }
}
