//! Export of the unified and duplicate-audit datasets.
//!
//! Three artifacts are produced from one pass over the final lists: the
//! unified CSV table, the duplicate-audit CSV table, and a line-delimited
//! JSON copy of the unified records. All writes are terminal — nothing
//! written here is read back — and a failure on one artifact never prevents
//! the others from being attempted.

use crate::error::ExportError;
use crate::{DuplicateAuditEntry, Record};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// UTF-8 byte-order mark, written at the start of the CSV artifacts so
/// spreadsheet tools detect the encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Separator for list-valued columns.
const LIST_SEPARATOR: &str = "; ";

const UNIFIED_COLUMNS: [&str; 16] = [
    "title",
    "authors",
    "year",
    "date",
    "journal",
    "doi",
    "url",
    "abstract",
    "keywords",
    "issn",
    "volume",
    "issue",
    "page_start",
    "page_end",
    "sources",
    "source_files",
];

const AUDIT_COLUMNS: [&str; 9] = [
    "dedupe_key_type",
    "dedupe_key_value",
    "kept_title",
    "kept_doi",
    "kept_sources",
    "dropped_title",
    "dropped_doi",
    "dropped_sources",
    "dropped_file",
];

/// Flat projection of a [`Record`] onto one unified-table row: scalars pass
/// through, list fields are joined with `"; "` in stored order.
#[derive(Debug, Serialize)]
struct UnifiedRow {
    title: String,
    authors: String,
    year: String,
    date: String,
    journal: String,
    doi: String,
    url: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
    keywords: String,
    issn: String,
    volume: String,
    issue: String,
    page_start: String,
    page_end: String,
    sources: String,
    source_files: String,
}

impl From<&Record> for UnifiedRow {
    fn from(record: &Record) -> Self {
        Self {
            title: record.title.clone(),
            authors: record.authors.join(LIST_SEPARATOR),
            year: record.year.clone(),
            date: record.date.clone(),
            journal: record.journal.clone(),
            doi: record.doi.clone(),
            url: record.url.clone(),
            abstract_text: record.abstract_text.clone(),
            keywords: record.keywords.join(LIST_SEPARATOR),
            issn: record.issn.clone(),
            volume: record.volume.clone(),
            issue: record.issue.clone(),
            page_start: record.page_start.clone(),
            page_end: record.page_end.clone(),
            sources: record.sources.join(LIST_SEPARATOR),
            source_files: record.source_files.join(LIST_SEPARATOR),
        }
    }
}

/// Outcome of one export pass: the artifacts that were written and the
/// per-artifact failures.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Artifacts written successfully.
    pub written: Vec<PathBuf>,
    /// Artifacts that failed, with the reason.
    pub failures: Vec<ExportError>,
}

impl ExportReport {
    /// True when every artifact was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Write the three output artifacts into `out_dir`:
///
/// - `<base_name>.csv` — the unified table,
/// - `<base_name>_dropped_duplicates.csv` — the duplicate-audit table,
/// - `<base_name>.jsonl` — one JSON object per unified record, with
///   list-valued fields kept as arrays.
///
/// The directory is created if absent. Each artifact is attempted
/// independently; failures are collected in the returned report.
pub fn export_outputs(
    unified: &[Record],
    duplicates: &[DuplicateAuditEntry],
    out_dir: &Path,
    base_name: &str,
) -> ExportReport {
    if let Err(err) = fs::create_dir_all(out_dir) {
        warn!(path = %out_dir.display(), error = %err, "could not create output directory");
    }

    let unified_path = out_dir.join(format!("{base_name}.csv"));
    let audit_path = out_dir.join(format!("{base_name}_dropped_duplicates.csv"));
    let jsonl_path = out_dir.join(format!("{base_name}.jsonl"));

    let attempts = [
        (unified_path.clone(), write_unified_csv(&unified_path, unified)),
        (audit_path.clone(), write_audit_csv(&audit_path, duplicates)),
        (jsonl_path.clone(), write_jsonl(&jsonl_path, unified)),
    ];

    let mut report = ExportReport::default();
    for (path, result) in attempts {
        match result {
            Ok(()) => {
                info!(path = %path.display(), "wrote artifact");
                report.written.push(path);
            }
            Err(err) => {
                warn!(error = %err, "artifact write failed");
                report.failures.push(err);
            }
        }
    }
    report
}

fn write_unified_csv(path: &Path, records: &[Record]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    out.write_all(UTF8_BOM).map_err(io_err)?;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(UNIFIED_COLUMNS).map_err(csv_err)?;
    for record in records {
        writer.serialize(UnifiedRow::from(record)).map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)
}

fn write_audit_csv(path: &Path, duplicates: &[DuplicateAuditEntry]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    out.write_all(UTF8_BOM).map_err(io_err)?;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(AUDIT_COLUMNS).map_err(csv_err)?;
    for entry in duplicates {
        writer.serialize(entry).map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)
}

fn write_jsonl(path: &Path, records: &[Record]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    for record in records {
        let line = serde_json::to_string(record).map_err(|source| ExportError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        out.write_all(line.as_bytes()).map_err(io_err)?;
        out.write_all(b"\n").map_err(io_err)?;
    }
    out.flush().map_err(io_err)
}
