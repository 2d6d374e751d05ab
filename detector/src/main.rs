// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Fake news detector CLI
//!
//! Usage:
//!   fakenews predict "Officials confirmed the report"
//!   fakenews --vocabulary tokenizer.json --model model.json explain - < article.txt
//!   fakenews --seed 7 counterfactual --target fake "Rates were held steady"

use anyhow::Result;
use clap::{Parser, Subcommand};
use fakenews_detector::service::{DetectorService, ExplainRequest, PredictRequest};
use fakenews_detector::{normalize, DetectorConfig, Lexicon};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fakenews")]
#[command(about = "Classify news text and explain the verdict")]
#[command(version)]
struct Args {
    /// Detector configuration (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Vocabulary artifact, overrides the configured path
    #[arg(long, global = true)]
    vocabulary: Option<PathBuf>,

    /// Classifier artifact, overrides the configured path
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Seed for the sensational prefix choice (random when absent)
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical form of a text
    Normalize { text: Option<String> },
    /// List sensationalist indicators found in a text
    Indicators { text: Option<String> },
    /// Classify a text
    Predict { text: Option<String> },
    /// Classify a text and explain the verdict
    Explain {
        text: Option<String>,
        /// Skip the counterfactual search
        #[arg(long)]
        no_counterfactual: bool,
    },
    /// Search for a minimal rewrite that moves the label
    Counterfactual {
        text: Option<String>,
        /// flip, real or fake
        #[arg(short, long, default_value = "flip")]
        target: String,
    },
    /// Report whether the model artifacts are loaded
    Health,
    /// Show model version and configuration
    Info,
}

/// Text from the argument, or stdin when it is absent or `-`
fn read_text(arg: Option<String>) -> Result<String> {
    match arg {
        Some(text) if text != "-" => Ok(text),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_service(args: &Args) -> Result<DetectorService> {
    let mut config = match &args.config {
        Some(path) => DetectorConfig::load(path)?,
        None => DetectorConfig::default(),
    };
    if let Some(path) = &args.vocabulary {
        config.vocabulary_path = path.clone();
    }
    if let Some(path) = &args.model {
        config.model_path = path.clone();
    }

    let service = DetectorService::new(config);
    // requests then fail with ArtifactUnavailable
    if let Err(e) = service.load_artifacts() {
        tracing::warn!("Model artifacts not loaded: {:#}", e);
    }
    Ok(service)
}

fn run(args: Args) -> Result<ExitCode> {
    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    match &args.command {
        Command::Normalize { text } => {
            let text = read_text(text.clone())?;
            println!("{}", normalize(&text));
            return Ok(ExitCode::SUCCESS);
        }
        Command::Indicators { text } => {
            let text = read_text(text.clone())?;
            print_json(&Lexicon::default().detect(&text))?;
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let service = build_service(&args)?;

    match args.command {
        Command::Predict { text } => {
            let request = PredictRequest {
                text: read_text(text)?,
            };
            print_json(&service.predict(&request)?)?;
        }
        Command::Explain {
            text,
            no_counterfactual,
        } => {
            let request = ExplainRequest {
                text: read_text(text)?,
                generate_counterfactual: !no_counterfactual,
            };
            print_json(&service.explain(&request, &mut rng)?)?;
        }
        Command::Counterfactual { text, target } => {
            let text = read_text(text)?;
            print_json(&service.counterfactual(&text, &target, &mut rng)?)?;
        }
        Command::Health => {
            let health = service.health();
            print_json(&health)?;
            if !health.is_ready() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Info => print_json(&service.info())?,
        Command::Normalize { .. } | Command::Indicators { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Args::parse())
}
