// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Explainable fake news detection
//!
//! This crate provides:
//! - Text canonicalization shared by classification and indicator analysis
//! - A predictor over pluggable encoder and classifier collaborators
//! - Sensationalist-language indicator detection
//! - Counterfactual search (toward REAL, toward FAKE, or flip)
//! - Explanations combining all of the above into a narrative
//! - A shared service context with readiness, health and info
//! - Offline evaluation over labelled corpora with seeded randomness

pub mod classifier;
pub mod config;
pub mod counterfactual;
pub mod datasets;
pub mod encoder;
pub mod error;
pub mod evaluation;
pub mod explainability;
pub mod indicators;
pub mod metrics;
pub mod normalize;
pub mod predictor;
pub mod service;

#[cfg(test)]
mod testing;

pub use classifier::{Classifier, LinearClassifier};
pub use config::DetectorConfig;
pub use counterfactual::{CounterfactualResult, CounterfactualSearch, Modification, Target};
pub use datasets::{Dataset, Sample};
pub use encoder::{EncodedSequence, Encoder, SequenceEncoder, Vocabulary};
pub use error::{DetectorError, Result};
pub use evaluation::{EvaluationConfig, EvaluationPipeline, EvaluationResults};
pub use explainability::{Explainer, Explanation};
pub use indicators::{IndicatorSet, Lexicon};
pub use metrics::{ClassificationReport, ConfusionMatrix, CounterfactualStats};
pub use normalize::{normalize, CanonicalText};
pub use predictor::{Label, Prediction, Predictor};
pub use service::{
    CounterfactualResponse, DetectorService, ExplainRequest, ExplanationResponse, HealthStatus,
    ModelInfo, PredictRequest, PredictionResponse,
};
