// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Stub classifiers and fixtures shared by unit tests

use crate::classifier::Classifier;
use crate::encoder::{EncodedSequence, SequenceEncoder, Vocabulary, OOV_TOKEN};
use crate::error::Result;
use crate::predictor::Predictor;
use std::collections::{HashMap, HashSet};

const COMMON_WORDS: &[&str] = &[
    "the", "officials", "confirmed", "report", "notable", "central", "bank", "rates",
    "growth", "breaking", "news",
];

/// Always returns the same score
pub(crate) struct FixedScore(pub f64);

impl Classifier for FixedScore {
    fn score(&self, _sequence: &EncodedSequence) -> Result<f64> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Scores 0.9 when any flagged index is present, 0.1 otherwise
pub(crate) struct TermScore {
    flagged: HashSet<u32>,
}

impl Classifier for TermScore {
    fn score(&self, sequence: &EncodedSequence) -> Result<f64> {
        if sequence.tokens().any(|id| self.flagged.contains(&id)) {
            Ok(0.9)
        } else {
            Ok(0.1)
        }
    }

    fn name(&self) -> &str {
        "term"
    }
}

pub(crate) fn test_vocabulary(extra: &[&str]) -> Vocabulary {
    let mut word_index: HashMap<String, u32> = HashMap::new();
    word_index.insert(OOV_TOKEN.to_string(), 1);
    for word in COMMON_WORDS.iter().chain(extra) {
        let next = word_index.len() as u32 + 1;
        word_index.entry(word.to_string()).or_insert(next);
    }
    Vocabulary::new(word_index, Some(OOV_TOKEN.to_string())).expect("test vocabulary is valid")
}

pub(crate) fn fixed_predictor(score: f64) -> Predictor {
    let encoder = SequenceEncoder::new(test_vocabulary(&[]), 32, 1_000);
    Predictor::new(Box::new(encoder), Box::new(FixedScore(score)))
}

/// FAKE exactly when one of `terms` survives normalization
pub(crate) fn term_predictor(terms: &[&str]) -> Predictor {
    let vocabulary = test_vocabulary(terms);
    let flagged = terms.iter().filter_map(|t| vocabulary.index_of(t)).collect();
    let encoder = SequenceEncoder::new(vocabulary, 32, 1_000);
    Predictor::new(Box::new(encoder), Box::new(TermScore { flagged }))
}
