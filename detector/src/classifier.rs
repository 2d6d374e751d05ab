// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Sequence classifiers
//!
//! The rest of the crate only ever sees `score(sequence) -> P(fake)`.
//! Implementations must be immutable once loaded so one instance can serve
//! concurrent requests without locking.

use crate::encoder::EncodedSequence;
use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trait for all sequence classifiers
pub trait Classifier: Send + Sync {
    /// Probability that the encoded text is fake, in `[0, 1]`
    fn score(&self, sequence: &EncodedSequence) -> Result<f64>;

    /// Get classifier name
    fn name(&self) -> &str;
}

/// Logistic scorer over averaged per-token weights
///
/// `P(fake) = sigmoid(bias + mean(weights[token] for non-pad tokens))`.
/// An empty sequence scores `sigmoid(bias)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    #[serde(default = "default_name")]
    name: String,
    bias: f64,
    /// Weight per vocabulary index
    weights: Vec<f64>,
}

fn default_name() -> String {
    "linear-bow".to_string()
}

impl LinearClassifier {
    pub fn new(name: impl Into<String>, bias: f64, weights: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            bias,
            weights,
        }
    }

    /// Load classifier weights exported as JSON
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read classifier: {}", path.display()))?;
        let classifier: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse classifier: {}", path.display()))?;

        if !classifier.bias.is_finite() || classifier.weights.iter().any(|w| !w.is_finite()) {
            anyhow::bail!("Classifier {} contains non-finite weights", path.display());
        }

        tracing::info!(
            "Classifier '{}' loaded: {} weights from {}",
            classifier.name,
            classifier.weights.len(),
            path.display()
        );
        Ok(classifier)
    }

    pub fn vocab_len(&self) -> usize {
        self.weights.len()
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }
}

impl Classifier for LinearClassifier {
    fn score(&self, sequence: &EncodedSequence) -> Result<f64> {
        let mut sum = 0.0;
        let mut count = 0usize;

        for id in sequence.tokens() {
            let weight = self.weights.get(id as usize).ok_or_else(|| {
                DetectorError::inference(format!(
                    "token index {} outside classifier vocabulary of {}",
                    id,
                    self.weights.len()
                ))
            })?;
            sum += weight;
            count += 1;
        }

        let logit = if count == 0 {
            self.bias
        } else {
            self.bias + sum / count as f64
        };
        Ok(Self::sigmoid(logit))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
