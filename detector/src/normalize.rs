// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Text canonicalization
//!
//! Reproduces the cleaning applied to the training corpus, step by step:
//! 1. Lowercase
//! 2. Drop the `(reuters)` source-agency tag
//! 3. Drop the dateline markers `washington -`, `london -`, `moscow -` and `etc -`
//! 4. Drop URLs (`http...`, `www...`) and email-like tokens
//! 5. Keep only ASCII letters, digits and whitespace
//! 6. Collapse whitespace runs and trim
//!
//! The patterns match the training-time transform and are not configurable.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static SOURCE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(reuters\)").expect("source tag pattern is valid"));

static DATELINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:washington|london|moscow|etc) -")
        .expect("dateline pattern is valid")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\S+").expect("url pattern is valid"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+").expect("email pattern is valid"));

/// Text in the exact form the vocabulary was fit against.
///
/// Only lowercase ASCII letters, digits and single spaces, never leading or
/// trailing whitespace. Can only be produced by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalText(String);

impl CanonicalText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space-separated words, in order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|w| !w.is_empty())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize raw text. Total, pure and deterministic.
///
/// Stripping punctuation can expose a new `http`/`www` prefix (`h-ttp...`),
/// so the removal passes repeat until the text stops changing. For ordinary
/// input that is a single pass; the result is always a fixed point, which
/// makes `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> CanonicalText {
    let mut current = canonical_pass(&text.to_lowercase());
    loop {
        let next = canonical_pass(&current);
        if next == current {
            return CanonicalText(current);
        }
        current = next;
    }
}

/// Steps 2-6 over already-lowercased text
fn canonical_pass(lowered: &str) -> String {
    let text = SOURCE_TAG.replace_all(lowered, "");
    let text = DATELINE.replace_all(&text, "");
    let text = URL.replace_all(&text, "");
    let text = EMAIL.replace_all(&text, "");

    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_leakage_markers() {
        let canonical =
            normalize("(Reuters) Washington - Officials confirmed the SHOCKING bombshell report");
        assert_eq!(
            canonical.as_str(),
            "officials confirmed the shocking bombshell report"
        );
    }

    #[test]
    fn test_dateline_markers_and_case() {
        assert_eq!(
            normalize("LONDON - Markets rallied (REUTERS)").as_str(),
            "markets rallied"
        );
        assert_eq!(normalize("Moscow - Talks resumed").as_str(), "talks resumed");
        assert_eq!(normalize("Paris etc - talks").as_str(), "paris talks");
    }

    #[test]
    fn test_other_cities_keep_their_dateline() {
        assert_eq!(
            normalize("New York - Markets rallied").as_str(),
            "new york markets rallied"
        );
        assert_eq!(normalize("Beijing - Talks resumed").as_str(), "beijing talks resumed");
    }

    #[test]
    fn test_removes_urls_and_emails() {
        let canonical = normalize(
            "Read more at https://example.com/a?b=1 or www.example.org, mail tips@example.com now",
        );
        assert_eq!(canonical.as_str(), "read more at or mail now");
    }

    #[test]
    fn test_keeps_digits_drops_punctuation() {
        assert_eq!(
            normalize("Inflation at 2%... below the 2.5% target!").as_str(),
            "inflation at 2 below the 25 target"
        );
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert!(normalize("").is_empty());
        assert!(normalize(" \t\n  ").is_empty());
        assert!(normalize("!!! ???").is_empty());
    }

    #[test]
    fn test_non_ascii_letters_are_dropped() {
        assert_eq!(normalize("Café déjà vu").as_str(), "caf dj vu");
    }

    #[test]
    fn test_punctuation_exposed_url_prefix_is_removed() {
        let once = normalize("visit h-ttp-example today");
        assert_eq!(once.as_str(), "visit today");
        assert_eq!(normalize(once.as_str()), once);
    }

    #[test]
    fn test_words_iterator() {
        let canonical = normalize("  One   two\tthree ");
        assert_eq!(canonical.words().collect::<Vec<_>>(), vec!["one", "two", "three"]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn idempotent(text in "\\PC{0,120}") {
            let once = normalize(&text);
            let twice = normalize(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn idempotent_on_url_like_noise(text in "[a-z.:/@() -]{0,60}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(once.as_str()), once);
        }

        #[test]
        fn canonical_alphabet(text in ".{0,200}") {
            let canonical = normalize(&text);
            let s = canonical.as_str();
            prop_assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' '));
            prop_assert!(!s.starts_with(' '));
            prop_assert!(!s.ends_with(' '));
            prop_assert!(!s.contains("  "));
        }
    }
}
