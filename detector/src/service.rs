// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Service context and wire contract
//!
//! `DetectorService` is built once at startup and shared read-only across
//! requests. The predictor slot is filled exactly once; until then every
//! classification-dependent call answers `ArtifactUnavailable`.
//!
//! Request/response types follow the HTTP contract (`/predict`, `/explain`,
//! `/health`, `/info`) so any transport can serialize them directly.

use crate::classifier::LinearClassifier;
use crate::config::DetectorConfig;
use crate::counterfactual::{CounterfactualResult, CounterfactualSearch, Target};
use crate::encoder::{SequenceEncoder, Vocabulary};
use crate::error::{DetectorError, Result};
use crate::explainability::{verdict_sentence, Explainer};
use crate::indicators::Lexicon;
use crate::predictor::{round4, Prediction, Predictor};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub result: String,
    pub confidence: f64,
    pub model_version: String,
    pub fake_probability: f64,
    pub real_probability: f64,
}

impl PredictionResponse {
    fn new(prediction: &Prediction, model_version: &str) -> Self {
        Self {
            result: prediction.label().to_string(),
            confidence: round4(prediction.confidence()),
            model_version: model_version.to_string(),
            fake_probability: round4(prediction.fake_probability()),
            real_probability: round4(prediction.real_probability()),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub text: String,
    #[serde(default = "default_true")]
    pub generate_counterfactual: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualResponse {
    pub original_text: String,
    pub modified_text: String,
    pub original_prediction: String,
    /// P(fake) of the original text
    pub original_confidence: f64,
    pub new_prediction: String,
    /// P(fake) of the modified text
    pub new_confidence: f64,
    pub modifications: Vec<String>,
    pub success: bool,
    pub key_indicators: Vec<String>,
}

impl CounterfactualResponse {
    fn new(result: &CounterfactualResult, key_indicators: Vec<String>) -> Self {
        Self {
            original_text: result.original_text().to_string(),
            modified_text: result.modified_text().to_string(),
            original_prediction: result.original_prediction().label().to_string(),
            original_confidence: round4(result.original_prediction().fake_probability()),
            new_prediction: result.new_prediction().label().to_string(),
            new_confidence: round4(result.new_prediction().fake_probability()),
            modifications: result.descriptions(),
            success: result.success(),
            key_indicators,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationResponse {
    pub prediction: PredictionResponse,
    pub counterfactual: Option<CounterfactualResponse>,
    pub explanation: String,
}

/// Readiness report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    pub tokenizer_loaded: bool,
    pub model_version: String,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.model_loaded && self.tokenizer_loaded
    }

    /// 200 when ready, 503 otherwise
    pub fn status_code(&self) -> u16 {
        if self.is_ready() {
            200
        } else {
            503
        }
    }
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_version: String,
    pub classifier: Option<String>,
    pub configuration: DetectorConfig,
    pub features: Vec<String>,
}

/// Shared, initialize-once detector context
#[derive(Debug)]
pub struct DetectorService {
    config: DetectorConfig,
    lexicon: Lexicon,
    predictor: OnceLock<Arc<Predictor>>,
}

impl DetectorService {
    /// A service with no artifacts yet; it is not ready until a predictor is
    /// installed
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            lexicon: Lexicon::default(),
            predictor: OnceLock::new(),
        }
    }

    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Load vocabulary and classifier from the configured paths
    pub fn load_artifacts(&self) -> anyhow::Result<()> {
        self.config.validate()?;
        tracing::info!("Loading model artifacts...");

        let vocabulary = Vocabulary::from_json_file(&self.config.vocabulary_path)?;
        let classifier = LinearClassifier::from_json_file(&self.config.model_path)?;
        let encoder = SequenceEncoder::new(vocabulary, self.config.max_length, self.config.vocab_size);

        self.install(Predictor::new(Box::new(encoder), Box::new(classifier)))?;
        tracing::info!(model_version = %self.config.model_version, "All artifacts loaded");
        Ok(())
    }

    /// Install the predictor; only the first call succeeds
    pub fn install(&self, predictor: Predictor) -> anyhow::Result<()> {
        self.predictor
            .set(Arc::new(predictor))
            .map_err(|_| anyhow::anyhow!("model artifacts are already loaded"))
    }

    pub fn is_ready(&self) -> bool {
        self.predictor.get().is_some()
    }

    /// The installed predictor, or `ArtifactUnavailable`
    pub fn predictor(&self) -> Result<&Arc<Predictor>> {
        self.predictor
            .get()
            .ok_or_else(|| DetectorError::unavailable("Model not loaded"))
    }

    pub fn health(&self) -> HealthStatus {
        let ready = self.is_ready();
        HealthStatus {
            status: if ready { "healthy" } else { "unavailable" }.to_string(),
            model_loaded: ready,
            tokenizer_loaded: ready,
            model_version: self.config.model_version.clone(),
        }
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_version: self.config.model_version.clone(),
            classifier: self
                .predictor
                .get()
                .map(|p| p.classifier_name().to_string()),
            configuration: self.config.clone(),
            features: self.config.features.clone(),
        }
    }

    pub fn predict(&self, request: &PredictRequest) -> Result<PredictionResponse> {
        let predictor = self.predictor().inspect_err(log_fault)?;
        let prediction = predictor.classify(&request.text).inspect_err(log_fault)?;
        Ok(PredictionResponse::new(&prediction, &self.config.model_version))
    }

    pub fn explain<R: Rng + ?Sized>(
        &self,
        request: &ExplainRequest,
        rng: &mut R,
    ) -> Result<ExplanationResponse> {
        let predictor = self.predictor().inspect_err(log_fault)?;

        if !request.generate_counterfactual {
            let prediction = predictor.classify(&request.text).inspect_err(log_fault)?;
            return Ok(ExplanationResponse {
                prediction: PredictionResponse::new(&prediction, &self.config.model_version),
                counterfactual: None,
                explanation: verdict_sentence(&prediction),
            });
        }

        let explanation = Explainer::new(predictor, &self.lexicon)
            .explain(&request.text, rng)
            .inspect_err(log_fault)?;

        Ok(ExplanationResponse {
            prediction: PredictionResponse::new(&explanation.prediction, &self.config.model_version),
            counterfactual: Some(CounterfactualResponse::new(
                &explanation.counterfactual,
                explanation.indicators.into_vec(),
            )),
            explanation: explanation.narrative,
        })
    }

    /// Targeted counterfactual search
    pub fn counterfactual<R: Rng + ?Sized>(
        &self,
        text: &str,
        target: &str,
        rng: &mut R,
    ) -> Result<CounterfactualResponse> {
        let target = target.parse::<Target>().inspect_err(log_fault)?;
        let predictor = self.predictor().inspect_err(log_fault)?;
        let result = CounterfactualSearch::new(predictor, &self.lexicon)
            .search(text, target, rng)
            .inspect_err(log_fault)?;
        let indicators = self.lexicon.detect(text).into_vec();
        Ok(CounterfactualResponse::new(&result, indicators))
    }
}

fn log_fault(err: &DetectorError) {
    if err.is_client_error() {
        tracing::warn!(code = err.code(), "request rejected: {}", err);
    } else {
        tracing::error!(code = err.code(), "request failed: {}", err);
    }
}
