//! Draft accumulator for records under construction.
//!
//! A [`RecordDraft`] holds the mutable field state while the scanner is in
//! its building state. Field updates follow the exchange-format conventions:
//! scalar tags are last-wins, the abstract keeps the longest value seen, and
//! author/keyword tags append. [`RecordDraft::finish`] turns the draft into a
//! finalized [`Record`] with dedup keys and provenance attached.

use crate::normalize::{collapse_whitespace, extract_year};
use crate::ris::tags::RisTag;
use crate::{Record, RecordOrigin};
use itertools::Itertools;

#[derive(Debug, Default)]
pub(crate) struct RecordDraft {
    title: String,
    journal: String,
    year: String,
    date: String,
    abstract_text: String,
    doi: String,
    url: String,
    issn: String,
    volume: String,
    issue: String,
    page_start: String,
    page_end: String,
    authors: Vec<String>,
    keywords: Vec<String>,
}

impl RecordDraft {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Apply one tagged field value to the draft.
    pub(crate) fn apply(&mut self, tag: &RisTag, value: &str) {
        match tag {
            RisTag::Title => self.title = collapse_whitespace(value),
            RisTag::SecondaryTitle => self.journal = collapse_whitespace(value),
            RisTag::Author => {
                let author = collapse_whitespace(value);
                if !author.is_empty() {
                    self.authors.push(author);
                }
            }
            RisTag::PrimaryDate => {
                self.year = extract_year(value);
                self.date = value.trim().to_string();
            }
            RisTag::Date => self.date = collapse_whitespace(value),
            RisTag::Abstract => {
                // Repeated abstracts resolve to the longest value, not a
                // concatenation.
                let candidate = collapse_whitespace(value);
                if candidate.chars().count() > self.abstract_text.chars().count() {
                    self.abstract_text = candidate;
                }
            }
            RisTag::Keyword => {
                let keyword = collapse_whitespace(value);
                if !keyword.is_empty() {
                    self.keywords.push(keyword);
                }
            }
            RisTag::Doi => self.doi = value.trim().to_string(),
            RisTag::Url => self.url = value.trim().to_string(),
            RisTag::Issn => self.issn = collapse_whitespace(value),
            RisTag::Volume => self.volume = collapse_whitespace(value),
            RisTag::Issue => self.issue = collapse_whitespace(value),
            RisTag::StartPage => self.page_start = collapse_whitespace(value),
            RisTag::EndPage => self.page_end = collapse_whitespace(value),
            // TY/ER drive the scanner, not the draft; unrecognized tags are
            // ignored.
            RisTag::Type | RisTag::EndOfReference | RisTag::Other(_) => {}
        }
    }

    /// Finalize the draft: de-duplicate the list fields, compute the dedup
    /// keys, and attach provenance as single-element lists (the full union
    /// across sources happens at merge time).
    pub(crate) fn finish(self, origin: &RecordOrigin) -> Record {
        let mut record = Record {
            title: self.title,
            authors: unique_preserving_order(self.authors),
            year: self.year,
            date: self.date,
            journal: self.journal,
            doi: self.doi,
            url: self.url,
            abstract_text: self.abstract_text,
            keywords: unique_preserving_order(self.keywords),
            issn: self.issn,
            volume: self.volume,
            issue: self.issue,
            page_start: self.page_start,
            page_end: self.page_end,
            sources: vec![origin.source.clone()],
            source_files: vec![origin.file.clone()],
            ..Default::default()
        };
        record.recompute_keys();
        record
    }
}

/// Drop case-insensitive duplicates, keeping the first occurrence.
fn unique_preserving_order(items: Vec<String>) -> Vec<String> {
    items.into_iter().unique_by(|s| s.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn origin() -> RecordOrigin {
        RecordOrigin::new("sage", "sage/export.ris")
    }

    #[test]
    fn test_scalar_fields_are_last_wins() {
        let mut draft = RecordDraft::new();
        draft.apply(&RisTag::Title, "First   Title");
        draft.apply(&RisTag::Title, "Second Title");
        draft.apply(&RisTag::Volume, "11");
        draft.apply(&RisTag::Volume, "12");

        let record = draft.finish(&origin());
        assert_eq!(record.title, "Second Title");
        assert_eq!(record.volume, "12");
    }

    #[test]
    fn test_abstract_keeps_longest() {
        let mut draft = RecordDraft::new();
        draft.apply(&RisTag::Abstract, "A longer abstract body.");
        draft.apply(&RisTag::Abstract, "Short.");

        let record = draft.finish(&origin());
        assert_eq!(record.abstract_text, "A longer abstract body.");
    }

    #[test]
    fn test_abstract_tie_keeps_first() {
        let mut draft = RecordDraft::new();
        draft.apply(&RisTag::Abstract, "aaaa");
        draft.apply(&RisTag::Abstract, "bbbb");

        let record = draft.finish(&origin());
        assert_eq!(record.abstract_text, "aaaa");
    }

    #[test]
    fn test_primary_date_sets_year_and_raw_date() {
        let mut draft = RecordDraft::new();
        draft.apply(&RisTag::PrimaryDate, "1998///");

        let record = draft.finish(&origin());
        assert_eq!(record.year, "1998");
        assert_eq!(record.date, "1998///");
    }

    #[test]
    fn test_alternate_date_overwrites() {
        let mut draft = RecordDraft::new();
        draft.apply(&RisTag::PrimaryDate, "2020/01/01");
        draft.apply(&RisTag::Date, "2020  Jun  9");

        let record = draft.finish(&origin());
        assert_eq!(record.year, "2020");
        assert_eq!(record.date, "2020 Jun 9");
    }

    #[test]
    fn test_keywords_deduplicated_case_insensitively() {
        let mut draft = RecordDraft::new();
        for kw in ["Machine Learning", "machine learning", "NLP", "nlp", "NLP"] {
            draft.apply(&RisTag::Keyword, kw);
        }

        let record = draft.finish(&origin());
        assert_eq!(record.keywords, vec!["Machine Learning", "NLP"]);
    }

    #[test]
    fn test_authors_deduplicated_and_blanks_dropped() {
        let mut draft = RecordDraft::new();
        draft.apply(&RisTag::Author, "Smith, John");
        draft.apply(&RisTag::Author, "   ");
        draft.apply(&RisTag::Author, "SMITH, JOHN");
        draft.apply(&RisTag::Author, "Doe, Jane");

        let record = draft.finish(&origin());
        assert_eq!(record.authors, vec!["Smith, John", "Doe, Jane"]);
    }

    #[test]
    fn test_finish_computes_keys_and_provenance() {
        let mut draft = RecordDraft::new();
        draft.apply(&RisTag::Title, "Café Studies");
        draft.apply(&RisTag::Doi, "DOI:10.9/X");

        let record = draft.finish(&origin());
        assert_eq!(record.canonical_title, "cafe studies");
        assert_eq!(record.doi, "DOI:10.9/X");
        assert_eq!(record.doi_norm, "10.9/x");
        assert_eq!(record.sources, vec!["sage"]);
        assert_eq!(record.source_files, vec!["sage/export.ris"]);
    }

    #[test]
    fn test_empty_draft_finishes_to_empty_record() {
        let record = RecordDraft::new().finish(&origin());
        assert_eq!(record.title, "");
        assert_eq!(record.doi_norm, "");
        assert_eq!(record.canonical_title, "");
        assert_eq!(record.sources, vec!["sage"]);
    }
}
