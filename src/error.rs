//! Error types for ingestion and export.
//!
//! The engine is best-effort by design: ingestion-time failures are isolated
//! to the offending directory or file, and export failures are isolated to
//! the offending artifact. These types carry the path context the aggregate
//! operations log before moving on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the single-directory and single-file ingestion
/// operations.
///
/// [`Ingestor::ingest_dirs`](crate::ingest::Ingestor::ingest_dirs) catches
/// every variant, logs it, and continues with the remaining inputs; none of
/// them aborts a run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A configured input directory does not exist or is not a directory.
    #[error("input directory {} is missing or not a directory", path.display())]
    MissingDirectory {
        /// The configured root that failed the check.
        path: PathBuf,
    },

    /// A candidate file failed the content-sniff heuristic and does not look
    /// like citation-exchange data. Skipped silently by the aggregate pass.
    #[error("{} does not look like a citation-exchange file", path.display())]
    FormatRejected {
        /// The rejected file.
        path: PathBuf,
    },

    /// A candidate file could not be read from disk.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The unreadable file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Failures raised while writing one output artifact.
///
/// A failed artifact never prevents the remaining artifacts from being
/// attempted; [`export_outputs`](crate::export::export_outputs) collects
/// these into the [`ExportReport`](crate::export::ExportReport).
#[derive(Error, Debug)]
pub enum ExportError {
    /// The artifact file could not be created or written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The artifact path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A row could not be serialized into the CSV artifact.
    #[error("csv serialization failed for {}: {source}", path.display())]
    Csv {
        /// The artifact path.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A record could not be serialized into the JSONL artifact.
    #[error("json serialization failed for {}: {source}", path.display())]
    Json {
        /// The artifact path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ExportError {
    /// Path of the artifact this error belongs to.
    pub fn path(&self) -> &PathBuf {
        match self {
            ExportError::Io { path, .. }
            | ExportError::Csv { path, .. }
            | ExportError::Json { path, .. } => path,
        }
    }
}
