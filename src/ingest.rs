//! File discovery and ingestion.
//!
//! Walks the configured source directories, picks out candidate files by
//! extension, sniffs their content for the tag-value shape, and drives the
//! parser over everything that passes. Every failure is isolated to the
//! offending directory or file: the aggregate operations log and continue,
//! favoring best-effort aggregation over all-or-nothing correctness.

use crate::error::IngestError;
use crate::regex::Regex;
use crate::ris::RisParser;
use crate::{Record, RecordOrigin};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// A tag-value line as the content sniff recognizes it.
static SNIFF_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{2}\s*-\s+").unwrap());

/// How many leading lines the content sniff inspects.
const SNIFF_LINE_LIMIT: usize = 200;

/// How many tag-value lines the sniff needs to accept a file.
const SNIFF_MIN_HITS: usize = 3;

/// Extensions recognized by default, compared case-insensitively.
pub const DEFAULT_EXTENSIONS: &[&str] = &["ris", "txt"];

/// One input root: a directory to scan and the source label its records are
/// stamped with.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDir {
    /// Directory to scan recursively.
    pub root: PathBuf,
    /// Source database label (e.g. `"sage"`).
    pub label: String,
}

impl SourceDir {
    /// Create a new source directory entry.
    pub fn new(root: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            label: label.into(),
        }
    }
}

/// Counters describing one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Directories that were scanned.
    pub dirs_scanned: usize,
    /// Configured directories that were missing and skipped.
    pub dirs_skipped: usize,
    /// Candidate files considered (extension matched).
    pub files_considered: usize,
    /// Candidate files rejected by the content sniff.
    pub files_rejected: usize,
    /// Candidate files that could not be read.
    pub files_failed: usize,
    /// Records parsed across all files.
    pub records: usize,
}

impl IngestStats {
    fn absorb(&mut self, other: &IngestStats) {
        self.dirs_scanned += other.dirs_scanned;
        self.dirs_skipped += other.dirs_skipped;
        self.files_considered += other.files_considered;
        self.files_rejected += other.files_rejected;
        self.files_failed += other.files_failed;
        self.records += other.records;
    }
}

/// Discovers and parses citation-exchange files.
///
/// Enumeration follows the filesystem's directory order; when reproducible
/// merge results matter, collect with [`candidate_files`], sort, and feed
/// [`ingest_files`] instead of using [`ingest_dirs`] directly.
///
/// [`candidate_files`]: Ingestor::candidate_files
/// [`ingest_files`]: Ingestor::ingest_files
/// [`ingest_dirs`]: Ingestor::ingest_dirs
#[derive(Debug, Clone)]
pub struct Ingestor {
    extensions: Vec<String>,
    parser: RisParser,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor {
    /// Creates an ingestor recognizing the default extensions (`.ris`,
    /// `.txt`).
    #[must_use]
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS.iter().copied())
    }

    /// Creates an ingestor recognizing a custom extension set
    /// (case-insensitive, with or without the leading dot).
    #[must_use]
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().trim_start_matches('.').to_lowercase();
                format!(".{ext}")
            })
            .collect();
        Self {
            extensions,
            parser: RisParser::new(),
        }
    }

    /// Recursively enumerate files under `root` whose name ends with a
    /// recognized extension.
    ///
    /// Returns [`IngestError::MissingDirectory`] when `root` does not exist
    /// or is not a directory. Subdirectories that cannot be read are logged
    /// and skipped.
    pub fn candidate_files(&self, root: &Path) -> Result<Vec<PathBuf>, IngestError> {
        if !root.is_dir() {
            return Err(IngestError::MissingDirectory {
                path: root.to_path_buf(),
            });
        }
        let mut out = Vec::new();
        self.collect_candidates(root, &mut out);
        Ok(out)
    }

    fn collect_candidates(&self, dir: &Path, out: &mut Vec<PathBuf>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "cannot list directory, skipping");
                return;
            }
        };
        for entry in entries {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path.is_dir() {
                self.collect_candidates(&path, out);
            } else if self.matches_extension(&path) {
                out.push(path);
            }
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let name = name.to_lowercase();
        self.extensions.iter().any(|ext| name.ends_with(ext))
    }

    /// Read, sniff, and parse a single candidate file.
    ///
    /// Returns [`IngestError::FormatRejected`] when the content does not
    /// look like citation-exchange data and [`IngestError::Read`] when the
    /// file cannot be read; both are treated as skips by the aggregate
    /// operations.
    pub fn ingest_file(&self, path: &Path, label: &str) -> Result<Vec<Record>, IngestError> {
        let text = read_text_with_fallback(path)?;
        if !looks_like_citation_text(&text) {
            return Err(IngestError::FormatRejected {
                path: path.to_path_buf(),
            });
        }
        let origin = RecordOrigin::new(label, path.display().to_string());
        Ok(self.parser.parse(&text, &origin))
    }

    /// Ingest an explicit file list under one source label.
    ///
    /// Per-file failures are logged and skipped; format rejections are
    /// silent (debug-level only).
    pub fn ingest_files(&self, files: &[PathBuf], label: &str) -> (Vec<Record>, IngestStats) {
        let mut records = Vec::new();
        let mut stats = IngestStats::default();
        for path in files {
            stats.files_considered += 1;
            match self.ingest_file(path, label) {
                Ok(parsed) => {
                    debug!(path = %path.display(), records = parsed.len(), "parsed candidate file");
                    stats.records += parsed.len();
                    records.extend(parsed);
                }
                Err(IngestError::FormatRejected { path }) => {
                    debug!(path = %path.display(), "content sniff rejected file");
                    stats.files_rejected += 1;
                }
                Err(err) => {
                    warn!(error = %err, "skipping unreadable candidate file");
                    stats.files_failed += 1;
                }
            }
        }
        (records, stats)
    }

    /// Ingest every configured directory in order.
    ///
    /// Missing directories are logged and skipped; everything else follows
    /// the per-file isolation of [`ingest_files`](Ingestor::ingest_files).
    pub fn ingest_dirs(&self, dirs: &[SourceDir]) -> (Vec<Record>, IngestStats) {
        let mut records = Vec::new();
        let mut stats = IngestStats::default();
        for dir in dirs {
            let files = match self.candidate_files(&dir.root) {
                Ok(files) => files,
                Err(err) => {
                    warn!(error = %err, "skipping configured input directory");
                    stats.dirs_skipped += 1;
                    continue;
                }
            };
            info!(
                source = %dir.label,
                path = %dir.root.display(),
                candidates = files.len(),
                "scanning source directory"
            );
            stats.dirs_scanned += 1;
            let (mut parsed, file_stats) = self.ingest_files(&files, &dir.label);
            stats.absorb(&file_stats);
            records.append(&mut parsed);
        }
        (records, stats)
    }
}

/// Read a file as text: UTF-8 first, Latin-1 as the fallback on decode
/// failure. The handle is released on every path.
fn read_text_with_fallback(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        // Latin-1 maps every byte to the code point of the same value.
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    })
}

/// Content sniff: at least [`SNIFF_MIN_HITS`] of the first
/// [`SNIFF_LINE_LIMIT`] lines look like tag-value lines.
fn looks_like_citation_text(text: &str) -> bool {
    text.lines()
        .take(SNIFF_LINE_LIMIT)
        .filter(|line| SNIFF_LINE_REGEX.is_match(line))
        .count()
        >= SNIFF_MIN_HITS
}
