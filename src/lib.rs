//! A library for reconciling bibliographic records exported by multiple
//! academic databases.
//!
//! `refmerge` ingests citation-exchange (RIS tag-value) files from one or more
//! source directories, parses them into structured records, normalizes the
//! identifying fields, deduplicates across sources by a fallback-key strategy
//! (DOI first, canonical title second), merges duplicates under an explicit
//! field-level policy, and produces a ranked unified dataset together with an
//! audit trail of every merge.
//!
//! # Pipeline
//!
//! ```text
//! directories -> candidate files -> parsed records -> merged records
//!                                                  -> duplicate audit entries
//! ```
//!
//! Each stage is usable on its own:
//!
//! - [`ingest::Ingestor`] discovers and reads citation files,
//! - [`RisParser`] turns tag-value text into [`Record`]s,
//! - [`dedupe::merge_records`] groups, merges, and ranks them,
//! - [`export::export_outputs`] writes the unified table, the duplicate-audit
//!   table, and a line-delimited JSON copy.
//!
//! # Basic Usage
//!
//! ```rust
//! use refmerge::{RecordOrigin, RisParser};
//!
//! let input = r#"TY  - JOUR
//! TI  - Example Article
//! AU  - Smith, John
//! ER  -"#;
//!
//! let records = RisParser::new().parse(input, &RecordOrigin::new("sage", "example.ris"));
//! assert_eq!(records[0].title, "Example Article");
//! ```
//!
//! # Deduplication
//!
//! ```rust
//! use refmerge::{dedupe::merge_records, Record};
//!
//! let mut a = Record::new();
//! a.title = "Deep Learning: A Survey".to_string();
//! let mut b = Record::new();
//! b.title = "deep learning a survey".to_string();
//! a.recompute_keys();
//! b.recompute_keys();
//!
//! let (unified, duplicates) = merge_records(vec![a, b]);
//! assert_eq!(unified.len(), 1);
//! assert_eq!(duplicates.len(), 1);
//! assert_eq!(duplicates[0].dedupe_key_type.as_str(), "title");
//! ```
//!
//! # Error Handling
//!
//! Ingestion is best-effort: a missing directory, an unreadable file, or a
//! file that does not look like citation-exchange data is logged (via
//! [`tracing`]) and skipped without aborting the run. Export failures are
//! isolated per artifact. See [`error`] for the error types.
//!
//! # Reproducibility
//!
//! The merge is single-pass and order-sensitive: which duplicate becomes the
//! kept record depends on the order files are discovered. Callers that need
//! reproducible output should collect candidate files themselves, sort them,
//! and feed [`ingest::Ingestor::ingest_files`].

use serde::{Deserialize, Serialize};

pub mod dedupe;
pub mod error;
pub mod export;
pub mod ingest;
pub mod normalize;
pub mod ris;

// Reexports
pub use error::{ExportError, IngestError};
pub use export::{ExportReport, export_outputs};
pub use ingest::{IngestStats, Ingestor, SourceDir};
pub use ris::RisParser;

mod regex;

/// Provenance of a parsed record: which source database it came from and
/// which file on disk held it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOrigin {
    /// Label of the source database (e.g. `"sage"`, `"sciencedirect"`).
    pub source: String,
    /// Path of the file the record was parsed from.
    pub file: String,
}

impl RecordOrigin {
    /// Create a new origin from a source label and a file path.
    pub fn new(source: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            file: file.into(),
        }
    }
}

/// A single bibliographic record.
///
/// All scalar fields are strings with the empty string meaning "absent";
/// records from real exports are sparse and one explicit shape keeps the
/// merge policy simple. The derived key fields ([`canonical_title`] and
/// [`doi_norm`]) are computed from `title`/`doi` and are not serialized —
/// [`recompute_keys`] restores them after deserialization or a merge.
///
/// [`canonical_title`]: Record::canonical_title
/// [`doi_norm`]: Record::doi_norm
/// [`recompute_keys`]: Record::recompute_keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Title of the work.
    pub title: String,
    /// Lowercase, accent-folded, punctuation-free form of the title, used as
    /// the fallback dedup key. Empty if the title is empty.
    #[serde(skip)]
    pub canonical_title: String,
    /// Authors in first-seen order, without case-insensitive duplicates.
    pub authors: Vec<String>,
    /// Publication year as a four-digit string, or empty.
    pub year: String,
    /// Raw publication date as exported by the source.
    pub date: String,
    /// Journal or secondary title.
    pub journal: String,
    /// Digital Object Identifier as exported by the source.
    pub doi: String,
    /// Normalized DOI (lowercase, scheme and `doi:` prefix stripped), the
    /// primary dedup key. Empty if no DOI is present.
    #[serde(skip)]
    pub doi_norm: String,
    /// URL of the work.
    pub url: String,
    /// Abstract text.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Keywords in first-seen order, without case-insensitive duplicates.
    pub keywords: Vec<String>,
    /// ISSN of the journal.
    pub issn: String,
    /// Volume number.
    pub volume: String,
    /// Issue number.
    pub issue: String,
    /// First page.
    pub page_start: String,
    /// Last page.
    pub page_end: String,
    /// Source database labels, unioned across merges.
    pub sources: Vec<String>,
    /// Source file paths, unioned across merges.
    pub source_files: Vec<String>,
}

impl Record {
    /// Create a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the derived dedup keys from the current `doi` and `title`.
    ///
    /// Called by the parser at flush time and by the merger after every merge
    /// so that exported keys stay consistent with exported content.
    pub fn recompute_keys(&mut self) {
        self.doi_norm = normalize::normalize_doi(&self.doi);
        self.canonical_title = normalize::canonical_title(&self.title);
    }
}

/// Which fallback key matched when two records were merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupeKeyType {
    /// Matched on normalized DOI.
    Doi,
    /// Matched on canonical title.
    Title,
}

impl DedupeKeyType {
    /// String form used in the duplicate-audit table.
    pub fn as_str(&self) -> &'static str {
        match self {
            DedupeKeyType::Doi => "doi",
            DedupeKeyType::Title => "title",
        }
    }
}

impl std::fmt::Display for DedupeKeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the duplicate audit trail.
///
/// Created exactly once per merge event, before the incoming record is folded
/// into the kept one, and never mutated afterwards. List-valued provenance is
/// captured as `"; "`-joined snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateAuditEntry {
    /// Key type that collided.
    pub dedupe_key_type: DedupeKeyType,
    /// Key value that collided.
    pub dedupe_key_value: String,
    /// Title of the kept record at merge time.
    pub kept_title: String,
    /// DOI of the kept record at merge time.
    pub kept_doi: String,
    /// Joined source labels of the kept record at merge time.
    pub kept_sources: String,
    /// Title of the dropped record.
    pub dropped_title: String,
    /// DOI of the dropped record.
    pub dropped_doi: String,
    /// Joined source labels of the dropped record.
    pub dropped_sources: String,
    /// Joined source file paths of the dropped record.
    pub dropped_file: String,
}

/// Ingest every configured directory with default settings and merge the
/// result.
///
/// Convenience wrapper over [`Ingestor::ingest_dirs`] followed by
/// [`dedupe::merge_records`]; returns the ranked unified records and the
/// duplicate audit trail. Use the individual stages directly for custom
/// extensions, sorted file order, or access to [`IngestStats`].
pub fn reconcile(dirs: &[SourceDir]) -> (Vec<Record>, Vec<DuplicateAuditEntry>) {
    let (records, _stats) = Ingestor::new().ingest_dirs(dirs);
    dedupe::merge_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_recompute_keys() {
        let mut record = Record::new();
        record.title = "Café Culture: An Overview".to_string();
        record.doi = "https://doi.org/10.1000/ABC".to_string();
        record.recompute_keys();

        assert_eq!(record.canonical_title, "cafe culture an overview");
        assert_eq!(record.doi_norm, "10.1000/abc");
    }

    #[test]
    fn test_recompute_keys_empty_fields() {
        let mut record = Record::new();
        record.recompute_keys();
        assert_eq!(record.canonical_title, "");
        assert_eq!(record.doi_norm, "");
    }

    #[test]
    fn test_dedupe_key_type_display() {
        assert_eq!(format!("{}", DedupeKeyType::Doi), "doi");
        assert_eq!(format!("{}", DedupeKeyType::Title), "title");
    }

    #[test]
    fn test_reconcile_across_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sage = dir.path().join("sage");
        let sciencedirect = dir.path().join("sciencedirect");
        fs::create_dir(&sage).unwrap();
        fs::create_dir(&sciencedirect).unwrap();

        fs::write(
            sage.join("export.ris"),
            "TY  - JOUR\nTI  - Shared Work\nDO  - 10.1/ABC\nPY  - 2021\nER  -\n",
        )
        .unwrap();
        fs::write(
            sciencedirect.join("export.txt"),
            "TY  - JOUR\nTI  - Shared work, extended title\nDO  - 10.1/abc\nPY  - 2021\nER  -\n",
        )
        .unwrap();

        let dirs = vec![
            SourceDir::new(&sage, "sage"),
            SourceDir::new(&sciencedirect, "sciencedirect"),
        ];
        let (unified, duplicates) = reconcile(&dirs);

        assert_eq!(unified.len(), 1);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].dedupe_key_type, DedupeKeyType::Doi);
        assert_eq!(duplicates[0].dedupe_key_value, "10.1/abc");
        assert_eq!(
            unified[0].sources,
            vec!["sage".to_string(), "sciencedirect".to_string()]
        );
        // The longer title from the second source wins the scalar merge.
        assert_eq!(unified[0].title, "Shared work, extended title");
    }

    #[test]
    fn test_reconcile_missing_directory_is_not_fatal() {
        let dirs = vec![SourceDir::new("/definitely/not/a/real/path", "ghost")];
        let (unified, duplicates) = reconcile(&dirs);
        assert!(unified.is_empty());
        assert!(duplicates.is_empty());
    }
}
