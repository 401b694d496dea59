//! Citation-exchange (RIS) format parser.
//!
//! RIS is a line-oriented tag-value format used by bibliographic databases to
//! export reference metadata: each line carries a two-character tag, a dash,
//! and a value. `TY` opens a record and `ER` closes it.
//!
//! Parsing is total: malformed lines and unrecognized tags are skipped, and a
//! record left open at end of input is still emitted. The parser therefore
//! returns records directly rather than a `Result`.
//!
//! # Example
//!
//! ```
//! use refmerge::{RecordOrigin, RisParser};
//!
//! let input = r#"TY  - JOUR
//! TI  - Example Title
//! AU  - Smith, John
//! ER  -"#;
//!
//! let records = RisParser::new().parse(input, &RecordOrigin::new("sage", "export.ris"));
//! assert_eq!(records[0].title, "Example Title");
//! ```

mod parse;
mod structure;
mod tags;

use crate::{Record, RecordOrigin};

/// Parser for citation-exchange (RIS) formatted text.
#[derive(Debug, Clone, Default)]
pub struct RisParser;

impl RisParser {
    /// Creates a new parser instance.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parses a string containing zero or more tag-value records.
    ///
    /// Every record is stamped with the given `origin` as its initial
    /// provenance. This never fails: lines that do not match the tag-value
    /// grammar are skipped.
    pub fn parse(&self, input: &str, origin: &RecordOrigin) -> Vec<Record> {
        parse::scan_records(input, origin)
    }
}
