//! Regex backend selection.
//!
//! The crate compiles against the full `regex` engine by default. Builds that
//! want a smaller dependency footprint can disable default features and enable
//! `lite` to use `regex-lite` instead; both expose the same `Regex` surface
//! for the patterns used here.

#[cfg(feature = "regex")]
pub(crate) use ::regex::Regex;

#[cfg(all(feature = "lite", not(feature = "regex")))]
pub(crate) use ::regex_lite::Regex;

#[cfg(not(any(feature = "regex", feature = "lite")))]
compile_error!("either the `regex` (default) or the `lite` feature must be enabled");
