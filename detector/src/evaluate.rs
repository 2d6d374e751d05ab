// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Offline evaluation of the detector against a labelled corpus
//!
//! Usage:
//!   evaluate-detector --vocabulary tokenizer.json --model model.json
//!   evaluate-detector --dataset isot --path ./datasets/isot --split test

use anyhow::Result;
use clap::Parser;
use fakenews_detector::evaluation::{EvaluationConfig, EvaluationPipeline};
use fakenews_detector::service::DetectorService;
use fakenews_detector::DetectorConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "evaluate-detector")]
#[command(about = "Evaluate the fake news detector on a labelled dataset")]
#[command(version)]
struct Args {
    /// Detector configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Vocabulary artifact, overrides the configured path
    #[arg(long)]
    vocabulary: Option<PathBuf>,

    /// Classifier artifact, overrides the configured path
    #[arg(long)]
    model: Option<PathBuf>,

    /// Dataset to evaluate on (synthetic, isot)
    #[arg(short, long, default_value = "synthetic")]
    dataset: String,

    /// Path to dataset directory
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Number of samples for the synthetic dataset
    #[arg(short, long, default_value_t = 1000)]
    num_samples: usize,

    /// Evaluation split (train, validation, test)
    #[arg(long, default_value = "test")]
    split: String,

    /// Evaluate at most this many samples
    #[arg(long)]
    max_samples: Option<usize>,

    /// Output directory for results
    #[arg(short, long, default_value = "eval/results")]
    output: PathBuf,

    /// Output format (json, markdown, both)
    #[arg(short, long, default_value = "both")]
    format: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut detector_config = match &args.config {
        Some(path) => DetectorConfig::load(path)?,
        None => DetectorConfig::default(),
    };
    if let Some(path) = args.vocabulary {
        detector_config.vocabulary_path = path;
    }
    if let Some(path) = args.model {
        detector_config.model_path = path;
    }

    let service = DetectorService::new(detector_config);
    service.load_artifacts()?;
    let predictor = service.predictor()?;

    tracing::info!("Dataset: {}", args.dataset);
    tracing::info!("Seed: {}", args.seed);
    tracing::info!("Split: {}", args.split);

    let config = EvaluationConfig {
        seed: args.seed,
        dataset_id: args.dataset.clone(),
        dataset_path: args.path,
        synthetic_size: args.num_samples,
        eval_split: args.split,
        max_samples: args.max_samples,
    };

    let mut pipeline = EvaluationPipeline::new(config);
    let results = pipeline.run(predictor, service.lexicon())?;

    println!("\n{}", "=".repeat(70));
    println!("EVALUATION SUMMARY");
    println!("{}", "=".repeat(70));
    println!(
        "\nClassifier: {} ({} samples evaluated, {} skipped)\n",
        results.classifier, results.dataset.eval_samples, results.skipped
    );
    println!("{}", results.report.format());
    println!("{}", results.counterfactuals.format());

    std::fs::create_dir_all(&args.output)?;
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");

    if args.format == "json" || args.format == "both" {
        let json_path = args.output.join(format!("eval_{}_{}.json", args.dataset, timestamp));
        EvaluationPipeline::save_results(&results, &json_path)?;
        println!("JSON results saved to: {}", json_path.display());
    }

    if args.format == "markdown" || args.format == "both" {
        let report = EvaluationPipeline::generate_report(&results);
        let md_path = args.output.join(format!("eval_{}_{}.md", args.dataset, timestamp));
        std::fs::write(&md_path, report)?;
        println!("Markdown report saved to: {}", md_path.display());
    }

    println!("\nEvaluation complete!");

    Ok(())
}
