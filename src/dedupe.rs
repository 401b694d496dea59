//! Duplicate detection and merging across sources.
//!
//! Records are grouped by a fallback key — normalized DOI when present,
//! canonical title otherwise — and folded together under a deterministic
//! field-level policy: scalars prefer the non-empty then the longer value,
//! lists union case-insensitively in first-seen order. Every merge event
//! leaves one immutable [`DuplicateAuditEntry`] behind.

use crate::{DedupeKeyType, DuplicateAuditEntry, Record};
use itertools::Itertools;
use std::collections::HashMap;
use std::mem;

/// Grouping key for one record.
///
/// Records with neither a normalized DOI nor a canonical title get an
/// [`Unmergeable`](DedupeKey::Unmergeable) key from their input-order
/// sequence number, so they never merge with anything — not even with a
/// byte-identical record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupeKey {
    Doi(String),
    Title(String),
    Unmergeable(usize),
}

fn key_for(record: &Record, seq: usize) -> DedupeKey {
    if !record.doi_norm.is_empty() {
        DedupeKey::Doi(record.doi_norm.clone())
    } else if !record.canonical_title.is_empty() {
        DedupeKey::Title(record.canonical_title.clone())
    } else {
        DedupeKey::Unmergeable(seq)
    }
}

/// Deduplicate and merge a flat record list.
///
/// Returns the unified records sorted by year descending then lowercase
/// title ascending, and one audit entry per merge event in the order the
/// merges happened.
///
/// The pass is single-threaded and order-sensitive: grouping uses each
/// record's key at arrival, and when two duplicates tie exactly under the
/// merge policy the first-seen value wins. Reordering the input can
/// therefore change which variant survives; sort the input files upstream
/// when reproducibility matters.
pub fn merge_records(records: Vec<Record>) -> (Vec<Record>, Vec<DuplicateAuditEntry>) {
    let mut kept: Vec<Record> = Vec::new();
    let mut by_key: HashMap<DedupeKey, usize> = HashMap::new();
    let mut duplicates: Vec<DuplicateAuditEntry> = Vec::new();

    for (seq, record) in records.into_iter().enumerate() {
        let key = key_for(&record, seq);
        match by_key.get(&key) {
            None => {
                by_key.insert(key, kept.len());
                kept.push(record);
            }
            Some(&slot) => {
                let existing = &mut kept[slot];
                duplicates.push(audit_entry(&key, existing, &record));
                merge_into(existing, record);
            }
        }
    }

    sort_unified(&mut kept);
    (kept, duplicates)
}

/// Snapshot a merge event before the incoming record is folded in.
fn audit_entry(key: &DedupeKey, kept: &Record, dropped: &Record) -> DuplicateAuditEntry {
    let (dedupe_key_type, dedupe_key_value) = match key {
        DedupeKey::Doi(value) => (DedupeKeyType::Doi, value.clone()),
        DedupeKey::Title(value) => (DedupeKeyType::Title, value.clone()),
        // Sequence numbers are unique within a pass, so these never collide.
        DedupeKey::Unmergeable(_) => unreachable!("unmergeable keys cannot collide"),
    };
    DuplicateAuditEntry {
        dedupe_key_type,
        dedupe_key_value,
        kept_title: kept.title.clone(),
        kept_doi: kept.doi.clone(),
        kept_sources: kept.sources.join("; "),
        dropped_title: dropped.title.clone(),
        dropped_doi: dropped.doi.clone(),
        dropped_sources: dropped.sources.join("; "),
        dropped_file: dropped.source_files.join("; "),
    }
}

/// Fold `incoming` into `kept` field by field, then recompute the kept
/// record's dedup keys from the merged content.
fn merge_into(kept: &mut Record, incoming: Record) {
    kept.title = prefer_longer(mem::take(&mut kept.title), incoming.title);
    kept.journal = prefer_longer(mem::take(&mut kept.journal), incoming.journal);
    kept.year = prefer_longer(mem::take(&mut kept.year), incoming.year);
    kept.date = prefer_longer(mem::take(&mut kept.date), incoming.date);
    kept.abstract_text = prefer_longer(mem::take(&mut kept.abstract_text), incoming.abstract_text);
    kept.doi = prefer_longer(mem::take(&mut kept.doi), incoming.doi);
    kept.url = prefer_longer(mem::take(&mut kept.url), incoming.url);
    kept.issn = prefer_longer(mem::take(&mut kept.issn), incoming.issn);
    kept.volume = prefer_longer(mem::take(&mut kept.volume), incoming.volume);
    kept.issue = prefer_longer(mem::take(&mut kept.issue), incoming.issue);
    kept.page_start = prefer_longer(mem::take(&mut kept.page_start), incoming.page_start);
    kept.page_end = prefer_longer(mem::take(&mut kept.page_end), incoming.page_end);

    kept.authors = merge_lists(mem::take(&mut kept.authors), incoming.authors);
    kept.keywords = merge_lists(mem::take(&mut kept.keywords), incoming.keywords);
    kept.sources = merge_lists(mem::take(&mut kept.sources), incoming.sources);
    kept.source_files = merge_lists(mem::take(&mut kept.source_files), incoming.source_files);

    // Grouping already happened with the key at arrival; recomputing keeps
    // the exported keys consistent with the merged content.
    kept.recompute_keys();
}

/// Scalar merge policy: prefer the non-empty value; when both are present,
/// the longer wins and ties keep the existing value.
fn prefer_longer(existing: String, incoming: String) -> String {
    if existing.is_empty() {
        incoming
    } else if incoming.is_empty() {
        existing
    } else if incoming.chars().count() > existing.chars().count() {
        incoming
    } else {
        existing
    }
}

/// List merge policy: case-insensitive union preserving first-seen order,
/// trimmed, blanks dropped.
fn merge_lists(existing: Vec<String>, incoming: Vec<String>) -> Vec<String> {
    existing
        .into_iter()
        .chain(incoming)
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .unique_by(|item| item.to_lowercase())
        .collect()
}

/// Rank by year descending, then lowercase title ascending. The sort is
/// stable, so exact ties keep arrival order.
fn sort_unified(records: &mut [Record]) {
    records.sort_by(|a, b| {
        year_rank(b)
            .cmp(&year_rank(a))
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });
}

/// Integer value of the leading (up to four) characters of the year field,
/// 0 when unparseable.
fn year_rank(record: &Record) -> i64 {
    let head: String = record.year.chars().take(4).collect();
    head.parse().unwrap_or(0)
}
