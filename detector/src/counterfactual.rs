// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Counterfactual search
//!
//! Given a text and a target, apply one deterministic-by-target perturbation
//! and re-classify:
//! - toward REAL: rewrite indicator words in the raw text to neutral terms
//!   (or drop them)
//! - toward FAKE: prepend one sensational prefix chosen uniformly at random
//!
//! This is a single-shot search. If the rewrite does not move the label the
//! result says so through `success = false`; nothing is retried.
//!
//! The random prefix choice comes from the caller's RNG, so seeding it
//! (e.g. `ChaCha8Rng::seed_from_u64`) makes the toward-FAKE branch
//! reproducible.

use crate::error::{DetectorError, Result};
use crate::indicators::{Lexicon, Substitute};
use crate::predictor::{Prediction, Predictor};
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Prefixes the toward-FAKE rewrite chooses from
pub const SENSATIONAL_PREFIXES: [&str; 4] =
    ["BREAKING: ", "SHOCKING: ", "EXCLUSIVE: ", "UNBELIEVABLE: "];

/// Which way the search should push the classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Opposite of the original label
    #[default]
    Flip,
    TowardReal,
    TowardFake,
}

impl Target {
    /// Resolve to "should the result be FAKE?"
    pub fn wants_fake(self, original: &Prediction) -> bool {
        match self {
            Target::Flip => !original.label().is_fake(),
            Target::TowardReal => false,
            Target::TowardFake => true,
        }
    }
}

impl FromStr for Target {
    type Err = DetectorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flip" => Ok(Target::Flip),
            "real" | "toward_real" => Ok(Target::TowardReal),
            "fake" | "toward_fake" => Ok(Target::TowardFake),
            _ => Err(DetectorError::InvalidTarget {
                value: s.to_string(),
            }),
        }
    }
}

/// One atomic edit made during the search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Modification {
    Replaced { original: String, replacement: String },
    Removed { original: String },
    PrefixAdded { prefix: String },
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modification::Replaced {
                original,
                replacement,
            } => write!(f, "Replaced '{}' with '{}'", original, replacement),
            Modification::Removed { original } => write!(f, "Removed '{}'", original),
            Modification::PrefixAdded { prefix } => {
                write!(f, "Added sensational prefix: '{}'", prefix.trim())
            }
        }
    }
}

/// Outcome of one search; built once, read-only afterwards
#[derive(Debug, Clone, Serialize)]
pub struct CounterfactualResult {
    target: Target,
    original_text: String,
    modified_text: String,
    original_prediction: Prediction,
    new_prediction: Prediction,
    modifications: Vec<Modification>,
    success: bool,
}

impl CounterfactualResult {
    pub fn target(&self) -> Target {
        self.target
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn modified_text(&self) -> &str {
        &self.modified_text
    }

    pub fn original_prediction(&self) -> &Prediction {
        &self.original_prediction
    }

    pub fn new_prediction(&self) -> &Prediction {
        &self.new_prediction
    }

    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// Human-readable description of each edit
    pub fn descriptions(&self) -> Vec<String> {
        self.modifications.iter().map(ToString::to_string).collect()
    }
}

/// Searches for a minimally edited text that reaches a target label
pub struct CounterfactualSearch<'a> {
    predictor: &'a Predictor,
    lexicon: &'a Lexicon,
}

impl<'a> CounterfactualSearch<'a> {
    pub fn new(predictor: &'a Predictor, lexicon: &'a Lexicon) -> Self {
        Self { predictor, lexicon }
    }

    pub fn search<R: Rng + ?Sized>(
        &self,
        text: &str,
        target: Target,
        rng: &mut R,
    ) -> Result<CounterfactualResult> {
        let original_prediction = self.predictor.classify(text)?;
        let wants_fake = target.wants_fake(&original_prediction);

        let (modified_text, modifications) = if wants_fake {
            let (text, modification) = sensationalize(text, rng);
            (text, vec![modification])
        } else {
            soften(text, self.lexicon)
        };

        let new_prediction = self.predictor.classify(&modified_text)?;
        let success = new_prediction.label().is_fake() == wants_fake;

        tracing::debug!(
            ?target,
            wants_fake,
            edits = modifications.len(),
            from = %original_prediction.label(),
            to = %new_prediction.label(),
            success,
            "counterfactual search finished"
        );

        Ok(CounterfactualResult {
            target,
            original_text: text.to_string(),
            modified_text,
            original_prediction,
            new_prediction,
            modifications,
            success,
        })
    }
}

/// Toward-REAL rewrite over whitespace tokens of the raw text
///
/// A token is tested by its ASCII letters, lowercased. Tokens are rejoined
/// with single spaces, skipping removed ones. Without any edit the text is
/// returned verbatim.
fn soften(text: &str, lexicon: &Lexicon) -> (String, Vec<Modification>) {
    let mut modifications = Vec::new();
    let mut tokens: Vec<String> = Vec::new();

    for token in text.split_whitespace() {
        let cleaned: String = token
            .chars()
            .filter(char::is_ascii_alphabetic)
            .collect::<String>()
            .to_ascii_lowercase();

        match lexicon.substitute_for(&cleaned) {
            Some(Substitute::Replace(replacement)) => {
                modifications.push(Modification::Replaced {
                    original: token.to_string(),
                    replacement: replacement.clone(),
                });
                tokens.push(replacement.clone());
            }
            Some(Substitute::Remove) => {
                modifications.push(Modification::Removed {
                    original: token.to_string(),
                });
            }
            None => tokens.push(token.to_string()),
        }
    }

    if modifications.is_empty() {
        return (text.to_string(), modifications);
    }
    (tokens.join(" "), modifications)
}

/// Toward-FAKE rewrite: one uniformly chosen prefix, prepended verbatim
fn sensationalize<R: Rng + ?Sized>(text: &str, rng: &mut R) -> (String, Modification) {
    let prefix = SENSATIONAL_PREFIXES[rng.gen_range(0..SENSATIONAL_PREFIXES.len())];
    (
        format!("{}{}", prefix, text),
        Modification::PrefixAdded {
            prefix: prefix.to_string(),
        },
    )
}
