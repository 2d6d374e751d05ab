// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Sensationalist-language indicators
//!
//! A fixed lexicon of hyperbolic, urgency and secrecy terms. Detection is a
//! case-insensitive substring test against the raw text, so a term can match
//! inside a longer word ("wow" in "wowed"). Indicators are advisory: they
//! justify explanations and drive the toward-REAL rewrite, but never feed
//! into classification.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Indicator terms, in reporting order
const FAKE_INDICATORS: &[&str] = &[
    "shocking",
    "unbelievable",
    "bombshell",
    "exclusive",
    "breaking",
    "revealed",
    "exposed",
    "conspiracy",
    "hidden",
    "secret",
    "truth",
    "mainstream media",
    "click here",
    "share this",
    "wow",
    "incredible",
    "amazing",
    "must see",
    "urgent",
];

/// Neutral rewrites; an empty string means "drop the word"
const NEUTRAL_REPLACEMENTS: &[(&str, &str)] = &[
    ("shocking", "notable"),
    ("unbelievable", "significant"),
    ("bombshell", "report"),
    ("exclusive", "news"),
    ("breaking", "recent"),
    ("revealed", "reported"),
    ("exposed", "disclosed"),
    ("conspiracy", "theory"),
    ("hidden", "undisclosed"),
    ("secret", "private"),
    ("incredible", "noteworthy"),
    ("amazing", "interesting"),
    ("wow", ""),
    ("must see", ""),
    ("urgent", "timely"),
];

/// What the toward-REAL rewrite does with a matched word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitute {
    Replace(String),
    Remove,
}

/// Indicator terms plus their neutral substitutes
#[derive(Debug, Clone)]
pub struct Lexicon {
    terms: Vec<String>,
    members: HashSet<String>,
    substitutes: HashMap<String, Substitute>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(
            FAKE_INDICATORS.iter().copied(),
            NEUTRAL_REPLACEMENTS.iter().copied(),
        )
    }
}

impl Lexicon {
    /// Build a lexicon. Terms are lowercased and deduplicated keeping the
    /// first occurrence; an empty replacement becomes [`Substitute::Remove`].
    pub fn new<'a>(
        terms: impl IntoIterator<Item = &'a str>,
        replacements: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut ordered = Vec::new();
        let mut members = HashSet::new();
        for term in terms {
            let term = term.to_lowercase();
            if members.insert(term.clone()) {
                ordered.push(term);
            }
        }

        let substitutes = replacements
            .into_iter()
            .map(|(term, replacement)| {
                let substitute = if replacement.is_empty() {
                    Substitute::Remove
                } else {
                    Substitute::Replace(replacement.to_string())
                };
                (term.to_lowercase(), substitute)
            })
            .collect();

        Self {
            terms: ordered,
            members,
            substitutes,
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn contains(&self, word: &str) -> bool {
        self.members.contains(word)
    }

    /// Substitute for a lexicon member, if one is defined
    pub fn substitute_for(&self, word: &str) -> Option<&Substitute> {
        if !self.contains(word) {
            return None;
        }
        self.substitutes.get(word)
    }

    /// Lexicon terms found in `text`, in lexicon order
    pub fn detect(&self, text: &str) -> IndicatorSet {
        let text_lower = text.to_lowercase();
        IndicatorSet(
            self.terms
                .iter()
                .filter(|term| text_lower.contains(term.as_str()))
                .cloned()
                .collect(),
        )
    }
}

/// Indicators found in one text, lexicon-ordered and deduplicated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IndicatorSet(Vec<String>);

impl IndicatorSet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.0.iter().any(|t| t == term)
    }

    /// First `n` indicators
    pub fn head(&self, n: usize) -> &[String] {
        &self.0[..n.min(self.0.len())]
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_in_lexicon_order() {
        let lexicon = Lexicon::default();
        let found = lexicon.detect("The BOMBSHELL report was SHOCKING");
        assert_eq!(found.iter().collect::<Vec<_>>(), vec!["shocking", "bombshell"]);
    }

    #[test]
    fn test_substring_matching_inside_words() {
        let lexicon = Lexicon::default();
        let found = lexicon.detect("The crowd was wowed by the secretary");
        assert!(found.contains("wow"));
        assert!(found.contains("secret"));
    }

    #[test]
    fn test_multiword_phrases() {
        let found = Lexicon::default().detect("Click here and SHARE THIS with the mainstream media!");
        assert_eq!(
            found.iter().collect::<Vec<_>>(),
            vec!["mainstream media", "click here", "share this"]
        );
    }

    #[test]
    fn test_repeated_terms_reported_once() {
        let found = Lexicon::default().detect("urgent urgent URGENT");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_neutral_text_has_no_indicators() {
        let found = Lexicon::default().detect("Central bank maintained rates citing moderate growth");
        assert!(found.is_empty());
    }

    #[test]
    fn test_substitutes() {
        let lexicon = Lexicon::default();
        assert_eq!(
            lexicon.substitute_for("shocking"),
            Some(&Substitute::Replace("notable".to_string()))
        );
        assert_eq!(lexicon.substitute_for("wow"), Some(&Substitute::Remove));
        // member without a rewrite
        assert_eq!(lexicon.substitute_for("truth"), None);
        assert_eq!(lexicon.substitute_for("calm"), None);
    }

    #[test]
    fn test_custom_lexicon_dedupes() {
        let lexicon = Lexicon::new(["Alarming", "alarming", "dire"], [("dire", "serious")]);
        assert_eq!(lexicon.terms(), &["alarming".to_string(), "dire".to_string()]);
        assert_eq!(lexicon.substitute_for("alarming"), None);
    }

    #[test]
    fn test_head_is_bounded() {
        let found = Lexicon::default().detect("shocking");
        assert_eq!(found.head(3).len(), 1);
    }
}
