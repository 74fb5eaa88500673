//! Keyword loading and matching.
//!
//! Matching is plain substring containment against either a file's base
//! name or its extracted text. Case-insensitive comparison uses full
//! Unicode case folding, so `"STRASSE"` matches `"straße"`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// What a keyword is matched against.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The file's base name.
    #[default]
    Filename,
    /// The file's extracted text.
    Content,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Filename => "filename",
            MatchMode::Content => "content",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collect keywords from the command line and an optional keywords file
/// (one per line), dropping exact duplicates while keeping first-seen order.
///
/// File lines are trimmed and blank lines skipped. Inline keywords are taken
/// as given, so an empty inline keyword matches every file.
pub fn load_keywords(inline: &[String], file: Option<&Path>) -> Result<Vec<String>, ConfigError> {
    let mut raw: Vec<String> = inline.to_vec();

    if let Some(path) = file {
        if !path.is_file() {
            return Err(ConfigError::KeywordsFileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        raw.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    let keywords = dedupe_keywords(raw);
    if keywords.is_empty() {
        return Err(ConfigError::NoKeywords);
    }
    Ok(keywords)
}

fn dedupe_keywords(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter().filter(|kw| seen.insert(kw.clone())).collect()
}

/// Substring containment, exact or case-folded.
pub fn contains_keyword(haystack: &str, keyword: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        haystack.contains(keyword)
    } else {
        caseless::default_case_fold_str(haystack).contains(&caseless::default_case_fold_str(keyword))
    }
}

/// Match `keyword` against the base name of `path`.
pub fn matches_filename(path: &Path, keyword: &str, case_sensitive: bool) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    contains_keyword(&name, keyword, case_sensitive)
}

/// Per-keyword matches plus their deduplicated union.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSet {
    /// Keywords in first-seen order with their matches in scan order.
    per_keyword: Vec<(String, Vec<PathBuf>)>,
    unique_targets: Vec<PathBuf>,
}

impl MatchSet {
    /// Match every PDF against every keyword.
    ///
    /// `pdfs` must already be in scan order. In content mode `texts` maps a
    /// path to its extracted text; missing entries count as empty text.
    pub fn compute(
        pdfs: &[PathBuf],
        keywords: &[String],
        mode: MatchMode,
        case_sensitive: bool,
        texts: &HashMap<PathBuf, String>,
    ) -> Self {
        let per_keyword: Vec<(String, Vec<PathBuf>)> = keywords
            .iter()
            .map(|keyword| {
                let matched = pdfs
                    .iter()
                    .filter(|pdf| match mode {
                        MatchMode::Filename => matches_filename(pdf, keyword, case_sensitive),
                        MatchMode::Content => texts
                            .get(*pdf)
                            .is_some_and(|text| contains_keyword(text, keyword, case_sensitive)),
                    })
                    .cloned()
                    .collect();
                (keyword.clone(), matched)
            })
            .collect();

        let matched: HashSet<&PathBuf> = per_keyword.iter().flat_map(|(_, m)| m).collect();
        let mut seen = HashSet::new();
        let unique_targets = pdfs
            .iter()
            .filter(|pdf| matched.contains(pdf) && seen.insert(*pdf))
            .cloned()
            .collect();

        Self {
            per_keyword,
            unique_targets,
        }
    }

    /// Keywords and their matched files, in keyword order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.per_keyword
            .iter()
            .map(|(kw, files)| (kw.as_str(), files.as_slice()))
    }

    pub fn matches_for(&self, keyword: &str) -> Option<&[PathBuf]> {
        self.per_keyword
            .iter()
            .find(|(kw, _)| kw == keyword)
            .map(|(_, files)| files.as_slice())
    }

    /// Every matched file once, in scan order.
    pub fn unique_targets(&self) -> &[PathBuf] {
        &self.unique_targets
    }

    pub fn is_empty(&self) -> bool {
        self.unique_targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_keywords_dedupes_in_order() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("keywords.txt");
        std::fs::write(&file, "  beta \n\nalpha\ngamma\n   \n").unwrap();

        let keywords =
            load_keywords(&strings(&["alpha", "beta", "Alpha"]), Some(&file)).unwrap();
        assert_eq!(keywords, ["alpha", "beta", "Alpha", "gamma"]);
    }

    #[test]
    fn test_blank_inline_keyword_is_kept() {
        assert_eq!(load_keywords(&strings(&["", "a", ""]), None).unwrap(), ["", "a"]);
        assert_eq!(load_keywords(&strings(&[""]), None).unwrap(), [""]);
        assert!(matches_filename(Path::new("in/anything.pdf"), "", false));
    }

    #[test]
    fn test_load_keywords_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_keywords(&[], None),
            Err(ConfigError::NoKeywords)
        ));
        assert!(matches!(
            load_keywords(&strings(&["a"]), Some(&dir.path().join("missing.txt"))),
            Err(ConfigError::KeywordsFileNotFound(_))
        ));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "\n \n").unwrap();
        assert!(matches!(
            load_keywords(&[], Some(&empty)),
            Err(ConfigError::NoKeywords)
        ));
    }

    #[test]
    fn test_filename_match_case_handling() {
        let path = Path::new("/reports/2024/Report.pdf");
        assert!(matches_filename(path, "report", false));
        assert!(!matches_filename(path, "report", true));
        assert!(matches_filename(path, "Report", true));
    }

    #[test]
    fn test_filename_match_ignores_directories() {
        assert!(!matches_filename(Path::new("/alpha/doc.pdf"), "alpha", false));
    }

    #[test]
    fn test_case_folding_is_unicode_aware() {
        assert!(contains_keyword("Die Straße", "STRASSE", false));
        assert!(!contains_keyword("Die Straße", "STRASSE", true));
    }

    #[test]
    fn test_substring_not_word_match() {
        assert!(contains_keyword("category", "cat", false));
    }

    #[test]
    fn test_match_set_filename_scenario() {
        let pdfs: Vec<PathBuf> = ["in/a_alpha.pdf", "in/b.pdf", "in/c_alpha_beta.pdf"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let set = MatchSet::compute(
            &pdfs,
            &strings(&["alpha", "beta"]),
            MatchMode::Filename,
            false,
            &HashMap::new(),
        );

        assert_eq!(
            set.matches_for("alpha").unwrap(),
            [pdfs[0].clone(), pdfs[2].clone()]
        );
        assert_eq!(set.matches_for("beta").unwrap(), [pdfs[2].clone()]);
        assert_eq!(set.unique_targets(), [pdfs[0].clone(), pdfs[2].clone()]);
        let order: Vec<&str> = set.iter().map(|(kw, _)| kw).collect();
        assert_eq!(order, ["alpha", "beta"]);
    }

    #[test]
    fn test_union_follows_scan_order_not_keyword_order() {
        let pdfs: Vec<PathBuf> = ["a_two.pdf", "b_one.pdf"].iter().map(PathBuf::from).collect();
        let set = MatchSet::compute(
            &pdfs,
            &strings(&["one", "two"]),
            MatchMode::Filename,
            false,
            &HashMap::new(),
        );
        assert_eq!(set.unique_targets(), pdfs.as_slice());
    }

    #[test]
    fn test_content_mode_uses_extracted_text() {
        let pdfs: Vec<PathBuf> = ["x.pdf", "y.pdf", "z.pdf"].iter().map(PathBuf::from).collect();
        let mut texts = HashMap::new();
        texts.insert(pdfs[0].clone(), "Quarterly BUDGET review".to_string());
        texts.insert(pdfs[1].clone(), String::new());

        let set = MatchSet::compute(
            &pdfs,
            &strings(&["budget", "x"]),
            MatchMode::Content,
            false,
            &texts,
        );
        assert_eq!(set.matches_for("budget").unwrap(), [pdfs[0].clone()]);
        assert!(set.matches_for("x").unwrap().is_empty());
        assert!(!set.is_empty());
    }

    #[test]
    fn test_no_matches() {
        let pdfs = vec![PathBuf::from("a.pdf")];
        let set = MatchSet::compute(
            &pdfs,
            &strings(&["zzz"]),
            MatchMode::Filename,
            false,
            &HashMap::new(),
        );
        assert!(set.is_empty());
        assert_eq!(set.matches_for("zzz").unwrap().len(), 0);
    }
}
