// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Detector configuration
//!
//! Mirrors the configuration persisted next to the model at training time.
//! Every field has a default, so a partial JSON file is enough.

use crate::encoder::{DEFAULT_MAX_LENGTH, DEFAULT_VOCAB_SIZE};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the detector service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Version string reported with every prediction
    pub model_version: String,
    /// Sequence length the classifier expects
    pub max_length: usize,
    /// Number of vocabulary entries kept by the tokenizer
    pub vocab_size: usize,
    /// Vocabulary artifact (JSON word index)
    pub vocabulary_path: PathBuf,
    /// Classifier artifact (JSON weights)
    pub model_path: PathBuf,
    /// Feature list advertised by `info`
    pub features: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_version: "v2.0-enhanced".to_string(),
            max_length: DEFAULT_MAX_LENGTH,
            vocab_size: DEFAULT_VOCAB_SIZE,
            vocabulary_path: PathBuf::from("tokenizer.json"),
            model_path: PathBuf::from("model.json"),
            features: vec![
                "Text Canonicalization".to_string(),
                "Sensational Indicator Detection".to_string(),
                "Counterfactual Generation".to_string(),
            ],
        }
    }
}

impl DetectorConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;

        tracing::info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            bail!("max_length must be positive");
        }
        // index 0 is padding, so at least one real word needs room
        if self.vocab_size < 2 {
            bail!("vocab_size must be at least 2, got {}", self.vocab_size);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_training() {
        let config = DetectorConfig::default();
        assert_eq!(config.max_length, 300);
        assert_eq!(config.vocab_size, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_length": 128, "model_version": "test-v1"}}"#).unwrap();

        let config = DetectorConfig::load(file.path()).unwrap();
        assert_eq!(config.max_length, 128);
        assert_eq!(config.model_version, "test-v1");
        assert_eq!(config.vocab_size, 10_000);
        assert_eq!(config.model_path, PathBuf::from("model.json"));
    }

    #[test]
    fn test_rejects_zero_length() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_length": 0}}"#).unwrap();
        assert!(DetectorConfig::load(file.path()).is_err());
    }
}
