// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Classification of raw text
//!
//! `normalize -> encode -> score -> Prediction`, with a fixed decision
//! threshold of 0.5. The comparison is strict: a score of exactly 0.5 is REAL.

use crate::classifier::Classifier;
use crate::encoder::Encoder;
use crate::error::{DetectorError, Result};
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores strictly above this are FAKE
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Binary verdict for an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Fake,
    Real,
}

impl Label {
    /// Apply the decision threshold to `P(fake)`
    pub fn from_fake_probability(probability: f64) -> Self {
        if probability > DECISION_THRESHOLD {
            Label::Fake
        } else {
            Label::Real
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Label::Fake => Label::Real,
            Label::Real => Label::Fake,
        }
    }

    pub fn is_fake(self) -> bool {
        self == Label::Fake
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Fake => "FAKE",
            Label::Real => "REAL",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one classification
///
/// `label == FAKE` iff `fake_probability > 0.5`,
/// `real_probability == 1 - fake_probability`,
/// `confidence == max(fake_probability, real_probability)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    label: Label,
    confidence: f64,
    fake_probability: f64,
    real_probability: f64,
}

impl Prediction {
    /// Build a prediction from a classifier score in `[0, 1]`
    pub fn from_fake_probability(fake_probability: f64) -> Self {
        let real_probability = 1.0 - fake_probability;
        let label = Label::from_fake_probability(fake_probability);
        let confidence = match label {
            Label::Fake => fake_probability,
            Label::Real => real_probability,
        };
        Self {
            label,
            confidence,
            fake_probability,
            real_probability,
        }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn fake_probability(&self) -> f64 {
        self.fake_probability
    }

    pub fn real_probability(&self) -> f64 {
        self.real_probability
    }
}

/// Round for display; never feed the result back into a decision
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Normalizer + encoder + classifier behind one call
pub struct Predictor {
    encoder: Box<dyn Encoder>,
    classifier: Box<dyn Classifier>,
}

impl Predictor {
    pub fn new(encoder: Box<dyn Encoder>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            encoder,
            classifier,
        }
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn max_length(&self) -> usize {
        self.encoder.max_length()
    }

    /// Classify raw text
    ///
    /// Empty or whitespace-only input is rejected before normalization.
    pub fn classify(&self, text: &str) -> Result<Prediction> {
        if text.trim().is_empty() {
            return Err(DetectorError::validation("Text cannot be empty"));
        }

        let canonical = normalize(text);
        let sequence = self.encoder.encode(&canonical);
        let score = self.classifier.score(&sequence)?;

        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(DetectorError::inference(format!(
                "classifier '{}' returned out-of-range score {}",
                self.classifier.name(),
                score
            )));
        }

        tracing::debug!(
            canonical_len = canonical.as_str().len(),
            tokens = sequence.token_count(),
            score,
            "classified"
        );

        Ok(Prediction::from_fake_probability(score))
    }
}

impl fmt::Debug for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predictor")
            .field("classifier", &self.classifier.name())
            .field("max_length", &self.encoder.max_length())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_predictor, term_predictor};

    #[test]
    fn test_threshold_tie_is_real() {
        let prediction = fixed_predictor(0.5).classify("Anything at all").unwrap();
        assert_eq!(prediction.label(), Label::Real);
        assert_eq!(prediction.confidence(), 0.5);
    }

    #[test]
    fn test_low_score_is_real_with_complement_confidence() {
        let prediction = fixed_predictor(0.1)
            .classify("Central bank maintained rates citing moderate growth")
            .unwrap();
        assert_eq!(prediction.label(), Label::Real);
        assert!((prediction.confidence() - 0.9).abs() < 1e-12);
        assert_eq!(prediction.real_probability(), 1.0 - prediction.fake_probability());
    }

    #[test]
    fn test_high_score_is_fake() {
        let prediction = fixed_predictor(0.87).classify("Some text").unwrap();
        assert_eq!(prediction.label(), Label::Fake);
        assert_eq!(prediction.confidence(), 0.87);
    }

    #[test]
    fn test_empty_input_is_validation_fault() {
        let predictor = fixed_predictor(0.9);
        for text in ["", "   ", "\n\t "] {
            let err = predictor.classify(text).unwrap_err();
            assert!(matches!(err, DetectorError::Validation { .. }), "{text:?}");
        }
    }

    #[test]
    fn test_out_of_range_score_is_inference_fault() {
        for score in [f64::NAN, 1.5, -0.1] {
            let err = fixed_predictor(score).classify("text").unwrap_err();
            assert!(matches!(err, DetectorError::Inference { .. }));
        }
    }

    #[test]
    fn test_classification_sees_canonical_text() {
        let predictor = term_predictor(&["shocking"]);
        assert_eq!(predictor.classify("SHOCKING!!!").unwrap().label(), Label::Fake);
        assert_eq!(predictor.classify("calm").unwrap().label(), Label::Real);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.5), 0.5);
    }

    #[test]
    fn test_label_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Label::Fake).unwrap(), "\"FAKE\"");
        assert_eq!(Label::Real.opposite(), Label::Fake);
    }
}
