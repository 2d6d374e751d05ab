// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Explanations for classifications
//!
//! Provides:
//! - The explanation payload (prediction, indicators, counterfactual, narrative)
//! - The explainer composing predictor, indicator detection and FLIP search
//! - Template-based narrative generation

use crate::counterfactual::{CounterfactualResult, CounterfactualSearch, Modification, Target};
use crate::error::Result;
use crate::indicators::{IndicatorSet, Lexicon};
use crate::predictor::{Prediction, Predictor};
use rand::Rng;
use serde::Serialize;

/// Indicators cited in the narrative
const NARRATIVE_INDICATORS: usize = 3;

/// Modifications cited in the narrative
const NARRATIVE_MODIFICATIONS: usize = 2;

/// Complete explanation for a prediction
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    /// The prediction being explained
    pub prediction: Prediction,
    /// Sensationalist terms found in the raw text
    pub indicators: IndicatorSet,
    /// FLIP-targeted counterfactual
    pub counterfactual: CounterfactualResult,
    /// Natural language summary
    pub narrative: String,
}

/// Builds explanations from a predictor and an indicator lexicon
pub struct Explainer<'a> {
    predictor: &'a Predictor,
    lexicon: &'a Lexicon,
}

impl<'a> Explainer<'a> {
    pub fn new(predictor: &'a Predictor, lexicon: &'a Lexicon) -> Self {
        Self { predictor, lexicon }
    }

    /// Explain the classification of `text`
    ///
    /// Built in a fixed order: prediction, indicators, counterfactual,
    /// narrative. A failure in any step fails the whole explanation.
    pub fn explain<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Result<Explanation> {
        let prediction = self.predictor.classify(text)?;
        let indicators = self.lexicon.detect(text);
        let counterfactual =
            CounterfactualSearch::new(self.predictor, self.lexicon).search(text, Target::Flip, rng)?;
        let narrative = render_narrative(&prediction, &indicators, counterfactual.modifications());

        tracing::debug!(
            label = %prediction.label(),
            indicators = indicators.len(),
            flipped = counterfactual.success(),
            "explanation built"
        );

        Ok(Explanation {
            prediction,
            indicators,
            counterfactual,
            narrative,
        })
    }
}

/// Opening sentence shared by every narrative
pub fn verdict_sentence(prediction: &Prediction) -> String {
    format!(
        "The article was classified as {} with {:.1}% confidence.",
        prediction.label(),
        prediction.confidence() * 100.0
    )
}

/// Generate the natural language summary
///
/// Cites at most three indicators and two modifications.
pub fn render_narrative(
    prediction: &Prediction,
    indicators: &IndicatorSet,
    modifications: &[Modification],
) -> String {
    let mut parts = vec![verdict_sentence(prediction)];

    if !indicators.is_empty() {
        parts.push(format!(
            "Key indicators found: {}.",
            indicators.head(NARRATIVE_INDICATORS).join(", ")
        ));
    }

    if !modifications.is_empty() {
        let edits: Vec<String> = modifications
            .iter()
            .take(NARRATIVE_MODIFICATIONS)
            .map(ToString::to_string)
            .collect();
        parts.push(format!("To flip the prediction, we could: {}.", edits.join("; ")));
    }

    parts.join(" ")
}
