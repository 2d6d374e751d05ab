// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Reproducible offline evaluation
//!
//! Orchestrates:
//! - Dataset loading (ISOT or synthetic)
//! - Classification and a FLIP counterfactual per sample
//! - Metrics and counterfactual statistics
//! - JSON results and a Markdown report

use crate::datasets::{Dataset, Sample};
use crate::explainability::Explainer;
use crate::indicators::Lexicon;
use crate::metrics::{ClassificationReport, CounterfactualStats};
use crate::predictor::{Label, Predictor};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Explanations kept in the results for inspection
const EXPLANATION_SAMPLES: usize = 5;

/// Configuration for an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Seed for dataset shuffling and counterfactual prefixes
    pub seed: u64,
    /// "synthetic" or "isot"
    pub dataset_id: String,
    /// Directory holding the dataset files
    pub dataset_path: Option<PathBuf>,
    /// Size of the generated corpus when `dataset_id` is "synthetic"
    pub synthetic_size: usize,
    /// Which split to evaluate ("test", "validation", "train")
    pub eval_split: String,
    /// Cap on evaluated samples (None = whole split)
    pub max_samples: Option<usize>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            dataset_id: "synthetic".to_string(),
            dataset_path: None,
            synthetic_size: 1000,
            eval_split: "test".to_string(),
            max_samples: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: String,
    pub name: String,
    pub total_samples: usize,
    pub eval_samples: usize,
    pub label_distribution: HashMap<String, usize>,
}

/// One explanation kept for the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationSample {
    pub id: String,
    pub text_preview: String,
    pub actual: Label,
    pub predicted: Label,
    pub confidence: f64,
    pub indicators: Vec<String>,
    pub narrative: String,
    pub counterfactual_text: String,
    pub flipped: bool,
}

/// Complete evaluation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResults {
    pub config: EvaluationConfig,
    pub classifier: String,
    pub dataset: DatasetSummary,
    pub report: ClassificationReport,
    pub counterfactuals: CounterfactualStats,
    /// Samples the detector rejected (empty text, inference faults)
    pub skipped: usize,
    pub explanations_sample: Vec<ExplanationSample>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Main evaluation pipeline
pub struct EvaluationPipeline {
    config: EvaluationConfig,
    dataset: Option<Dataset>,
}

impl EvaluationPipeline {
    pub fn new(config: EvaluationConfig) -> Self {
        Self {
            config,
            dataset: None,
        }
    }

    /// Use an already loaded dataset
    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Load the dataset named by the configuration
    pub fn load_dataset(&mut self) -> Result<()> {
        let dataset = match (self.config.dataset_id.as_str(), &self.config.dataset_path) {
            ("synthetic", _) => {
                tracing::info!(
                    "Loading synthetic dataset ({} samples, seed={})",
                    self.config.synthetic_size,
                    self.config.seed
                );
                Dataset::load_synthetic(self.config.synthetic_size, self.config.seed)
            }
            ("isot", Some(path)) => {
                tracing::info!("Loading ISOT dataset from {}", path.display());
                Dataset::load_isot(path, self.config.seed)?
            }
            ("isot", None) => bail!("dataset 'isot' needs a dataset path"),
            (other, _) => bail!("unknown dataset '{}' (expected synthetic or isot)", other),
        };

        tracing::info!(
            "Dataset loaded: {} samples (train={}, val={}, test={})",
            dataset.total_samples(),
            dataset.train.len(),
            dataset.validation.len(),
            dataset.test.len()
        );

        self.dataset = Some(dataset);
        Ok(())
    }

    fn eval_samples<'d>(&self, dataset: &'d Dataset) -> &'d [Sample] {
        let split = match self.config.eval_split.as_str() {
            "train" => &dataset.train,
            "validation" | "val" => &dataset.validation,
            _ => &dataset.test,
        };
        let cap = self.config.max_samples.unwrap_or(split.len()).min(split.len());
        &split[..cap]
    }

    /// Classify and explain every sample of the evaluation split
    pub fn run(&mut self, predictor: &Predictor, lexicon: &Lexicon) -> Result<EvaluationResults> {
        if self.dataset.is_none() {
            self.load_dataset()?;
        }
        let Some(dataset) = self.dataset.as_ref() else {
            bail!("no dataset loaded");
        };
        let samples = self.eval_samples(dataset);

        let explainer = Explainer::new(predictor, lexicon);
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let mut scored = Vec::with_capacity(samples.len());
        let mut counterfactuals = CounterfactualStats::default();
        let mut explanations_sample = Vec::new();
        let mut skipped = 0;

        for sample in samples {
            let explanation = match explainer.explain(&sample.text, &mut rng) {
                Ok(explanation) => explanation,
                Err(e) => {
                    tracing::warn!(id = %sample.id, code = e.code(), "Skipping sample: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            scored.push((sample.label, explanation.prediction.fake_probability()));
            counterfactuals.record(&explanation.counterfactual);

            if explanations_sample.len() < EXPLANATION_SAMPLES {
                explanations_sample.push(ExplanationSample {
                    id: sample.id.clone(),
                    text_preview: preview(&sample.text, 80),
                    actual: sample.label,
                    predicted: explanation.prediction.label(),
                    confidence: explanation.prediction.confidence(),
                    counterfactual_text: preview(explanation.counterfactual.modified_text(), 80),
                    flipped: explanation.counterfactual.success(),
                    indicators: explanation.indicators.into_vec(),
                    narrative: explanation.narrative,
                });
            }
        }

        let report = ClassificationReport::from_scores(&scored);
        tracing::info!(
            "{} - Accuracy: {:.4}, F1: {:.4}, flip rate: {:.4}",
            predictor.classifier_name(),
            report.accuracy,
            report.f1_score,
            counterfactuals.success_rate()
        );

        let dataset_summary = DatasetSummary {
            id: dataset.info.id.clone(),
            name: dataset.info.name.clone(),
            total_samples: dataset.total_samples(),
            eval_samples: samples.len(),
            label_distribution: Dataset::label_distribution(samples)
                .into_iter()
                .map(|(label, count)| (label.to_string(), count))
                .collect(),
        };

        Ok(EvaluationResults {
            config: self.config.clone(),
            classifier: predictor.classifier_name().to_string(),
            dataset: dataset_summary,
            report,
            counterfactuals,
            skipped,
            explanations_sample,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Save results to a JSON file
    pub fn save_results(results: &EvaluationResults, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(output_path, json)?;
        tracing::info!("Results saved to {}", output_path.display());
        Ok(())
    }

    /// Render a Markdown report
    pub fn generate_report(results: &EvaluationResults) -> String {
        let mut report = String::new();

        report.push_str("# Fake News Detection Evaluation Report\n\n");
        report.push_str(&format!(
            "**Generated:** {}\n\n",
            results.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        report.push_str(&format!("**Version:** {}\n\n", results.version));
        report.push_str(&format!("**Classifier:** {}\n\n", results.classifier));

        report.push_str("## Dataset\n\n");
        report.push_str(&format!("- **ID:** {}\n", results.dataset.id));
        report.push_str(&format!("- **Name:** {}\n", results.dataset.name));
        report.push_str(&format!("- **Total Samples:** {}\n", results.dataset.total_samples));
        report.push_str(&format!(
            "- **Evaluated:** {} ({} split, {} skipped)\n\n",
            results.dataset.eval_samples, results.config.eval_split, results.skipped
        ));

        report.push_str("## Classification\n\n");
        report.push_str(&format!("```\n{}```\n\n", results.report.format()));

        report.push_str("## Counterfactuals\n\n");
        report.push_str("| Attempted | Flipped | Flip Rate | Unchanged | Avg. Modifications |\n");
        report.push_str("|-----------|---------|-----------|-----------|--------------------|\n");
        report.push_str(&format!(
            "| {} | {} | {:.4} | {} | {:.2} |\n\n",
            results.counterfactuals.attempted,
            results.counterfactuals.succeeded,
            results.counterfactuals.success_rate(),
            results.counterfactuals.unchanged,
            results.counterfactuals.avg_modifications()
        ));

        if !results.explanations_sample.is_empty() {
            report.push_str("## Sample Explanations\n\n");
            for (i, exp) in results.explanations_sample.iter().enumerate() {
                report.push_str(&format!("**Example {}:** {}\n\n", i + 1, exp.text_preview));
                report.push_str(&format!(
                    "- Actual: {}, predicted: {} (confidence: {:.2}%)\n",
                    exp.actual,
                    exp.predicted,
                    exp.confidence * 100.0
                ));
                if !exp.indicators.is_empty() {
                    report.push_str(&format!("- Indicators: {}\n", exp.indicators.join(", ")));
                }
                report.push_str(&format!("- Counterfactual: {}\n", exp.counterfactual_text));
                report.push_str(&format!("- {}\n\n", exp.narrative));
            }
        }

        report.push_str("## Configuration\n\n");
        report.push_str(&format!(
            "```json\n{}\n```\n",
            serde_json::to_string_pretty(&results.config).unwrap_or_default()
        ));

        report
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect::<String>() + "..."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_predictor, term_predictor};

    const FLAGGED: &[&str] = &["shocking", "secret", "truth", "conspiracy", "exclusive"];

    fn synthetic_config(size: usize) -> EvaluationConfig {
        EvaluationConfig {
            synthetic_size: size,
            ..EvaluationConfig::default()
        }
    }

    #[test]
    fn test_pipeline_synthetic() {
        let predictor = term_predictor(FLAGGED);
        let mut pipeline = EvaluationPipeline::new(synthetic_config(200));
        let results = pipeline.run(&predictor, &Lexicon::default()).unwrap();

        assert_eq!(results.dataset.eval_samples, 20);
        assert_eq!(results.report.support, 20);
        assert!((results.report.accuracy - 1.0).abs() < 1e-9);
        assert_eq!(results.counterfactuals.attempted, 20);
        assert_eq!(results.skipped, 0);
        assert_eq!(results.explanations_sample.len(), EXPLANATION_SAMPLES);
        assert_eq!(results.classifier, "term");
    }

    #[test]
    fn test_pipeline_is_reproducible() {
        let predictor = fixed_predictor(0.2);
        let run = || {
            EvaluationPipeline::new(synthetic_config(100))
                .run(&predictor, &Lexicon::default())
                .unwrap()
        };
        let (a, b) = (run(), run());
        let texts = |r: &EvaluationResults| {
            r.explanations_sample
                .iter()
                .map(|e| e.counterfactual_text.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(texts(&a), texts(&b));
    }

    #[test]
    fn test_max_samples_caps_split() {
        let config = EvaluationConfig {
            eval_split: "train".to_string(),
            max_samples: Some(7),
            ..synthetic_config(100)
        };
        let results = EvaluationPipeline::new(config)
            .run(&fixed_predictor(0.7), &Lexicon::default())
            .unwrap();
        assert_eq!(results.counterfactuals.attempted, 7);
    }

    #[test]
    fn test_unknown_dataset_rejected() {
        let config = EvaluationConfig {
            dataset_id: "liar".to_string(),
            ..EvaluationConfig::default()
        };
        let mut pipeline = EvaluationPipeline::new(config);
        assert!(pipeline.run(&fixed_predictor(0.5), &Lexicon::default()).is_err());
    }

    #[test]
    fn test_report_and_save() {
        let predictor = term_predictor(FLAGGED);
        let results = EvaluationPipeline::new(synthetic_config(50))
            .run(&predictor, &Lexicon::default())
            .unwrap();

        let report = EvaluationPipeline::generate_report(&results);
        assert!(report.contains("Fake News Detection Evaluation Report"));
        assert!(report.contains("## Counterfactuals"));
        assert!(report.contains("Sample Explanations"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");
        EvaluationPipeline::save_results(&results, &path).unwrap();
        let saved: EvaluationResults =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.report.support, results.report.support);
    }
}
