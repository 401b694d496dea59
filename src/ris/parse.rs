//! Line-level parsing and the record scanner.
//!
//! The scanner is an explicit two-state machine over a tag-value line stream:
//! **Idle** between records and **Building** while one is open. Making the
//! state explicit keeps the start/end-of-record edge cases (repeated start
//! tag, missing terminator, field tags outside any record) testable in
//! isolation.

use crate::regex::Regex;
use crate::ris::structure::RecordDraft;
use crate::ris::tags::RisTag;
use crate::{Record, RecordOrigin};
use std::sync::LazyLock;

/// One field per line: `<2-char alnum tag><whitespace>-<whitespace><value>`.
static TAG_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z0-9]{2})\s*-\s*(.*)$").unwrap());

#[derive(Debug)]
enum ScanState {
    Idle,
    Building(RecordDraft),
}

/// Explicit state machine turning a tag-value line stream into records.
#[derive(Debug)]
pub(crate) struct RecordScanner<'a> {
    state: ScanState,
    records: Vec<Record>,
    origin: &'a RecordOrigin,
}

impl<'a> RecordScanner<'a> {
    pub(crate) fn new(origin: &'a RecordOrigin) -> Self {
        Self {
            state: ScanState::Idle,
            records: Vec::new(),
            origin,
        }
    }

    /// Feed one line to the scanner.
    ///
    /// Lines that do not match the tag-value grammar are skipped. A start tag
    /// while a record is already open flushes the open record first; field
    /// tags while idle are a defensive no-op.
    pub(crate) fn handle_line(&mut self, line: &str) {
        let Some((tag, value)) = split_tag_line(line) else {
            return;
        };

        match tag {
            RisTag::Type => {
                self.flush();
                self.state = ScanState::Building(RecordDraft::new());
            }
            RisTag::EndOfReference => self.flush(),
            field => {
                if let ScanState::Building(draft) = &mut self.state {
                    draft.apply(&field, value);
                }
            }
        }
    }

    /// Finalize the open record, if any, and return to idle.
    fn flush(&mut self) {
        if let ScanState::Building(draft) = std::mem::replace(&mut self.state, ScanState::Idle) {
            self.records.push(draft.finish(self.origin));
        }
    }

    /// End of stream: an unterminated record is still flushed.
    pub(crate) fn finish(mut self) -> Vec<Record> {
        self.flush();
        self.records
    }
}

/// Scan a whole text into records.
pub(crate) fn scan_records(text: &str, origin: &RecordOrigin) -> Vec<Record> {
    let mut scanner = RecordScanner::new(origin);
    for line in text.lines() {
        scanner.handle_line(line);
    }
    scanner.finish()
}

/// Split a line into its tag and raw value, or `None` when the line does not
/// match the tag-value grammar.
fn split_tag_line(line: &str) -> Option<(RisTag, &str)> {
    let caps = TAG_LINE_REGEX.captures(line)?;
    let tag = RisTag::from_tag(caps.get(1).map_or("", |m| m.as_str()));
    let value = caps.get(2).map_or("", |m| m.as_str());
    Some((tag, value))
}
