//! Two-character tag classification for the citation-exchange format.
//!
//! Tags that carry a field the unified schema keeps get a semantic variant;
//! everything else is carried as [`RisTag::Other`] and ignored downstream.

use compact_str::CompactString;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum RisTag {
    /// `TY` — opens a record.
    Type,
    /// `ER` — closes a record.
    EndOfReference,
    /// `TI` / `T1` — title (both aliases write the same field).
    Title,
    /// `T2` / `JF` / `JO` — journal (secondary title).
    SecondaryTitle,
    /// `AU` — author, repeatable.
    Author,
    /// `PY` / `Y1` — primary date, carries the year.
    PrimaryDate,
    /// `DA` — alternate date.
    Date,
    /// `AB` / `N2` — abstract.
    Abstract,
    /// `KW` — keyword, repeatable.
    Keyword,
    /// `DO` — DOI.
    Doi,
    /// `UR` — URL.
    Url,
    /// `SN` — ISSN.
    Issn,
    /// `VL` — volume.
    Volume,
    /// `IS` — issue.
    Issue,
    /// `SP` — start page.
    StartPage,
    /// `EP` — end page.
    EndPage,
    /// Any other recognized-shape tag.
    Other(CompactString),
}

impl RisTag {
    /// Classify a two-character tag as matched by the line grammar.
    pub(crate) fn from_tag(tag: &str) -> Self {
        match tag {
            "TY" => RisTag::Type,
            "ER" => RisTag::EndOfReference,
            "TI" | "T1" => RisTag::Title,
            "T2" | "JF" | "JO" => RisTag::SecondaryTitle,
            "AU" => RisTag::Author,
            "PY" | "Y1" => RisTag::PrimaryDate,
            "DA" => RisTag::Date,
            "AB" | "N2" => RisTag::Abstract,
            "KW" => RisTag::Keyword,
            "DO" => RisTag::Doi,
            "UR" => RisTag::Url,
            "SN" => RisTag::Issn,
            "VL" => RisTag::Volume,
            "IS" => RisTag::Issue,
            "SP" => RisTag::StartPage,
            "EP" => RisTag::EndPage,
            other => RisTag::Other(CompactString::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("TY", RisTag::Type)]
    #[case("ER", RisTag::EndOfReference)]
    #[case("TI", RisTag::Title)]
    #[case("T1", RisTag::Title)]
    #[case("T2", RisTag::SecondaryTitle)]
    #[case("JF", RisTag::SecondaryTitle)]
    #[case("JO", RisTag::SecondaryTitle)]
    #[case("AU", RisTag::Author)]
    #[case("PY", RisTag::PrimaryDate)]
    #[case("Y1", RisTag::PrimaryDate)]
    #[case("DA", RisTag::Date)]
    #[case("AB", RisTag::Abstract)]
    #[case("N2", RisTag::Abstract)]
    #[case("KW", RisTag::Keyword)]
    #[case("DO", RisTag::Doi)]
    #[case("UR", RisTag::Url)]
    #[case("SN", RisTag::Issn)]
    #[case("VL", RisTag::Volume)]
    #[case("IS", RisTag::Issue)]
    #[case("SP", RisTag::StartPage)]
    #[case("EP", RisTag::EndPage)]
    fn test_from_tag_known(#[case] tag: &str, #[case] expected: RisTag) {
        assert_eq!(RisTag::from_tag(tag), expected);
    }

    #[test]
    fn test_from_tag_other() {
        assert_eq!(RisTag::from_tag("C1"), RisTag::Other(CompactString::new("C1")));
        assert_eq!(RisTag::from_tag("M3"), RisTag::Other(CompactString::new("M3")));
    }
}
