// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Labelled news corpora for offline evaluation

use crate::predictor::Label;
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// A single labelled article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Unique identifier
    pub id: String,
    /// Title and body, as fed to the detector
    pub text: String,
    /// Ground truth
    pub label: Label,
    /// Source columns kept for reporting (title, subject, date)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Descriptive information about a corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub source: String,
}

/// A corpus split 80/10/10 into train, validation and test
#[derive(Debug, Clone)]
pub struct Dataset {
    pub info: DatasetInfo,
    pub train: Vec<Sample>,
    pub validation: Vec<Sample>,
    pub test: Vec<Sample>,
}

impl Dataset {
    /// Load the ISOT corpus (`Fake.csv` and `True.csv`) from a directory
    ///
    /// Both files carry `title,text,subject,date` columns. Rows that fail to
    /// parse or have an empty body are skipped with a warning. The combined
    /// samples are shuffled with `seed` before splitting.
    pub fn load_isot(data_dir: &Path, seed: u64) -> Result<Self> {
        let info = DatasetInfo {
            id: "isot".to_string(),
            name: "ISOT Fake News Dataset".to_string(),
            description: "Real and fake news articles with title, subject and date".to_string(),
            source: "https://onlineacademiccommunity.uvic.ca/isot/".to_string(),
        };

        let fake = Self::load_isot_csv(&data_dir.join("Fake.csv"), Label::Fake)?;
        let real = Self::load_isot_csv(&data_dir.join("True.csv"), Label::Real)?;
        tracing::info!(fake = fake.len(), real = real.len(), "ISOT corpus loaded");

        let mut samples: Vec<Sample> = fake.into_iter().chain(real).collect();
        samples.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

        Ok(Self::split(info, samples))
    }

    fn load_isot_csv(path: &Path, label: Label) -> Result<Vec<Sample>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open ISOT file: {}", path.display()))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let prefix = label.as_str().to_lowercase();
        let mut samples = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping record {} in {}: {}", idx, path.display(), e);
                    continue;
                }
            };

            let title = record.get(0).unwrap_or("").trim();
            let body = record.get(1).unwrap_or("").trim();
            if body.is_empty() && title.is_empty() {
                tracing::warn!("Skipping record {} in {}: empty article", idx, path.display());
                continue;
            }

            let text = match (title.is_empty(), body.is_empty()) {
                (true, _) => body.to_string(),
                (_, true) => title.to_string(),
                _ => format!("{} {}", title, body),
            };

            let mut metadata = HashMap::new();
            metadata.insert("title".to_string(), title.to_string());
            metadata.insert("subject".to_string(), record.get(2).unwrap_or("").to_string());
            metadata.insert("date".to_string(), record.get(3).unwrap_or("").to_string());

            samples.push(Sample {
                id: format!("{}_{}", prefix, idx),
                text,
                label,
                metadata,
            });
        }

        Ok(samples)
    }

    /// Generate a small labelled corpus for pipeline testing
    ///
    /// Fake samples are built from sensational phrasing, real ones from
    /// wire-service phrasing. Deterministic for a given seed.
    pub fn load_synthetic(size: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let info = DatasetInfo {
            id: "synthetic".to_string(),
            name: "Synthetic Test Dataset".to_string(),
            description: "Generated dataset for pipeline testing".to_string(),
            source: "generated".to_string(),
        };

        let fake_phrases = [
            "BREAKING: Shocking bombshell revealed about officials",
            "You won't believe this unbelievable secret they hid",
            "The mainstream media is hiding the truth, share this",
            "Urgent: incredible conspiracy exposed, must see",
            "Exclusive: amazing hidden evidence, click here",
        ];

        let real_phrases = [
            "(Reuters) WASHINGTON - The committee approved the budget on Tuesday",
            "Central bank maintained interest rates citing moderate growth",
            "The ministry said in a statement that talks will resume next week",
            "Quarterly earnings rose three percent according to the filing",
            "Officials confirmed the bill passed with bipartisan support",
        ];

        let samples = (0..size)
            .map(|i| {
                let is_fake = rng.gen_bool(0.5);
                let phrases = if is_fake { &fake_phrases } else { &real_phrases };
                let phrase = phrases[rng.gen_range(0..phrases.len())];

                Sample {
                    id: format!("synthetic_{}", i),
                    text: format!("{} (sample {})", phrase, i),
                    label: if is_fake { Label::Fake } else { Label::Real },
                    metadata: HashMap::new(),
                }
            })
            .collect();

        Self::split(info, samples)
    }

    fn split(info: DatasetInfo, mut samples: Vec<Sample>) -> Self {
        let n = samples.len();
        let train_end = (n as f64 * 0.8) as usize;
        let val_end = (n as f64 * 0.9) as usize;

        let test = samples.split_off(val_end);
        let validation = samples.split_off(train_end);

        Self {
            info,
            train: samples,
            validation,
            test,
        }
    }

    pub fn total_samples(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    /// Label counts for a split
    pub fn label_distribution(samples: &[Sample]) -> HashMap<Label, usize> {
        let mut dist = HashMap::new();
        for sample in samples {
            *dist.entry(sample.label).or_insert(0) += 1;
        }
        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, body: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn test_synthetic_dataset() {
        let dataset = Dataset::load_synthetic(100, 42);

        assert_eq!(dataset.info.id, "synthetic");
        assert_eq!(dataset.total_samples(), 100);
        assert_eq!(dataset.train.len(), 80);
        assert_eq!(dataset.validation.len(), 10);
        assert_eq!(dataset.test.len(), 10);
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let a = Dataset::load_synthetic(20, 7);
        let b = Dataset::load_synthetic(20, 7);
        let texts = |d: &Dataset| d.train.iter().map(|s| s.text.clone()).collect::<Vec<_>>();
        assert_eq!(texts(&a), texts(&b));
    }

    #[test]
    fn test_label_distribution() {
        let dataset = Dataset::load_synthetic(1000, 42);
        let dist = Dataset::label_distribution(&dataset.train);

        let fake = *dist.get(&Label::Fake).unwrap_or(&0);
        let real = *dist.get(&Label::Real).unwrap_or(&0);

        // Allow 20% deviation from perfect balance
        let expected = dataset.train.len() / 2;
        let tolerance = expected / 5;

        assert!((fake as i64 - expected as i64).unsigned_abs() < tolerance as u64);
        assert!((real as i64 - expected as i64).unsigned_abs() < tolerance as u64);
    }

    #[test]
    fn test_load_isot() {
        let dir = tempfile::tempdir().unwrap();
        let mut fake = String::from("title,text,subject,date\n");
        let mut real = String::from("title,text,subject,date\n");
        for i in 0..10 {
            fake.push_str(&format!("\"Shocking claim {i}\",\"Body, with comma {i}\",News,2017\n"));
            real.push_str(&format!("Budget vote {i},The committee met {i},politics,2017\n"));
        }
        // empty article is skipped
        fake.push_str(",,News,2017\n");
        write_csv(dir.path(), "Fake.csv", &fake);
        write_csv(dir.path(), "True.csv", &real);

        let dataset = Dataset::load_isot(dir.path(), 42).unwrap();
        assert_eq!(dataset.total_samples(), 20);
        assert_eq!(dataset.test.len(), 2);

        let all: Vec<&Sample> = dataset
            .train
            .iter()
            .chain(&dataset.validation)
            .chain(&dataset.test)
            .collect();
        let sample = all.iter().find(|s| s.id == "fake_3").unwrap();
        assert_eq!(sample.text, "Shocking claim 3 Body, with comma 3");
        assert_eq!(sample.label, Label::Fake);
        assert_eq!(sample.metadata.get("subject").map(String::as_str), Some("News"));
    }

    #[test]
    fn test_load_isot_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "Fake.csv", "title,text,subject,date\n");
        assert!(Dataset::load_isot(dir.path(), 0).is_err());
    }
}
