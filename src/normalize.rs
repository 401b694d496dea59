//! Normalization of identifying fields into comparable dedup keys.
//!
//! Every function here is pure, total, and deterministic: arbitrary input in,
//! a (possibly empty) string out, never an error. The two key normalizers are
//! idempotent — applying one twice yields the same result as applying it once
//! — so keys recomputed after a merge stay stable.

use crate::regex::Regex;
use itertools::Itertools;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static DOI_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^doi:").unwrap());

static DOI_SCHEME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://(?:dx\.)?doi\.org/").unwrap());

/// Normalize a DOI into its comparable form.
///
/// Trims, converts backslashes to slashes, removes embedded whitespace,
/// strips a leading `doi:` label and a leading `http(s)://[dx.]doi.org/`
/// scheme (both case-insensitive, repeated until none remains), and
/// lowercases the remainder. Returns the empty string for input with no DOI
/// content.
pub fn normalize_doi(raw: &str) -> String {
    let compact: String = raw
        .trim()
        .replace('\\', "/")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut rest = compact.as_str();
    loop {
        if let Some(m) = DOI_PREFIX_REGEX.find(rest) {
            rest = &rest[m.end()..];
            continue;
        }
        if let Some(m) = DOI_SCHEME_REGEX.find(rest) {
            rest = &rest[m.end()..];
            continue;
        }
        break;
    }

    rest.to_lowercase()
}

/// Canonicalize a title for case-, accent-, and punctuation-insensitive
/// comparison.
///
/// Lowercases, NFKD-decomposes and drops combining marks (so `"Café"` and
/// `"CAFE"` agree), replaces every maximal run of non-alphanumeric characters
/// with a single space, and trims.
pub fn canonical_title(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut out = String::with_capacity(folded.len());
    let mut gap = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if gap && !out.is_empty() {
                out.push(' ');
            }
            gap = false;
            out.push(c);
        } else {
            gap = true;
        }
    }
    out
}

/// Extract a publication year from a raw date field.
///
/// Returns the first run of exactly four consecutive digits anywhere in the
/// string (so `"2021/05/30"` yields `"2021"` but a five-digit run does not
/// match), or the empty string.
pub fn extract_year(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == 4 {
                return raw[start..i].to_string();
            }
        } else {
            i += 1;
        }
    }
    String::new()
}

/// Collapse every run of whitespace (including non-breaking spaces) to a
/// single space and trim the ends.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("10.1000/test", "10.1000/test")]
    #[case("10.1000/TEST", "10.1000/test")]
    #[case("  10.1000/test  ", "10.1000/test")]
    #[case("doi:10.1000/test", "10.1000/test")]
    #[case("DOI: 10.1000/test", "10.1000/test")]
    #[case("https://doi.org/10.1000/test", "10.1000/test")]
    #[case("http://dx.doi.org/10.1000/test", "10.1000/test")]
    #[case("HTTPS://DOI.ORG/10.1000/TEST", "10.1000/test")]
    #[case("doi:https://doi.org/10.1000/test", "10.1000/test")]
    #[case("10.1000\\test", "10.1000/test")]
    #[case("10.1000/ te st", "10.1000/test")]
    #[case("", "")]
    fn test_normalize_doi(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_doi(input), expected);
    }

    #[rstest]
    #[case("Café", "cafe")]
    #[case("CAFE", "cafe")]
    #[case("Deep Learning: A Survey", "deep learning a survey")]
    #[case("  Ética   e  IA  ", "etica e ia")]
    #[case("Naïve---Bayes!!", "naive bayes")]
    #[case("", "")]
    #[case("???", "")]
    fn test_canonical_title(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonical_title(input), expected);
    }

    #[rstest]
    #[case("2021", "2021")]
    #[case("2021/05/30", "2021")]
    #[case("Published 1998, reprinted 2005", "1998")]
    #[case("12345", "")]
    #[case("123", "")]
    #[case("12345 then 2020", "2020")]
    #[case("", "")]
    #[case("no digits here", "")]
    fn test_extract_year(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(extract_year(input), expected);
    }

    #[test]
    fn test_normalize_doi_idempotent() {
        for raw in [
            "DOI:10.1000/Test",
            "https://doi.org/10.5555/X y",
            "doi:doi:10.1/abc",
            "plain text",
        ] {
            let once = normalize_doi(raw);
            assert_eq!(normalize_doi(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_canonical_title_idempotent() {
        for raw in ["Café Culture!", "MiXeD   CASE", "Ünïcòdé-Heavy (2020)"] {
            let once = canonical_title(raw);
            assert_eq!(canonical_title(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b\u{a0}c  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }
}
