// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Sequence encoding against the training vocabulary
//!
//! Maps canonical text to a fixed-length sequence of vocabulary indices.
//! Index 0 is reserved for padding; the OOV token (if any) owns its own index.
//! Sequences are padded and truncated at the end ("post"), matching the
//! training-time policy.

use crate::normalize::CanonicalText;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Sequence length used at training time
pub const DEFAULT_MAX_LENGTH: usize = 300;

/// Tokenizer `num_words` used at training time
pub const DEFAULT_VOCAB_SIZE: usize = 10_000;

/// Reserved padding index
pub const PAD_INDEX: u32 = 0;

/// Default out-of-vocabulary token
pub const OOV_TOKEN: &str = "<OOV>";

/// Fixed-length sequence of vocabulary indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedSequence(Vec<u32>);

impl EncodedSequence {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of non-padding entries
    pub fn token_count(&self) -> usize {
        self.0.iter().filter(|&&id| id != PAD_INDEX).count()
    }

    /// Non-padding entries in order
    pub fn tokens(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied().filter(|&id| id != PAD_INDEX)
    }
}

/// Anything that turns canonical text into a model input
pub trait Encoder: Send + Sync {
    fn encode(&self, text: &CanonicalText) -> EncodedSequence;

    /// Length of every sequence this encoder produces
    fn max_length(&self) -> usize;
}

/// Word index fitted at training time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Word -> index (1-based; 0 is padding)
    word_index: HashMap<String, u32>,
    /// OOV token, if the tokenizer was fit with one
    #[serde(default)]
    oov_token: Option<String>,
}

impl Vocabulary {
    pub fn new(word_index: HashMap<String, u32>, oov_token: Option<String>) -> Result<Self> {
        let vocabulary = Self {
            word_index,
            oov_token,
        };
        vocabulary.check()?;
        Ok(vocabulary)
    }

    /// Load a vocabulary exported as JSON (`{"oov_token": .., "word_index": {..}}`)
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary: {}", path.display()))?;
        let vocabulary: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse vocabulary: {}", path.display()))?;
        vocabulary
            .check()
            .with_context(|| format!("Invalid vocabulary: {}", path.display()))?;

        tracing::info!(
            "Vocabulary loaded: {} words (oov={:?}) from {}",
            vocabulary.len(),
            vocabulary.oov_token,
            path.display()
        );
        Ok(vocabulary)
    }

    fn check(&self) -> Result<()> {
        if self.word_index.values().any(|&idx| idx == PAD_INDEX) {
            bail!("index {} is reserved for padding", PAD_INDEX);
        }
        if let Some(ref oov) = self.oov_token {
            if !self.word_index.contains_key(oov) {
                bail!("OOV token '{}' missing from word index", oov);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }

    pub fn index_of(&self, word: &str) -> Option<u32> {
        self.word_index.get(word).copied()
    }

    pub fn oov_index(&self) -> Option<u32> {
        self.oov_token.as_deref().and_then(|t| self.index_of(t))
    }

    /// Map words to indices, keeping only the `vocab_size` most frequent
    /// (indices `< vocab_size`). Anything else becomes OOV or is dropped.
    pub fn texts_to_sequence<'a>(
        &self,
        words: impl Iterator<Item = &'a str>,
        vocab_size: usize,
    ) -> Vec<u32> {
        let oov = self.oov_index();
        words
            .filter_map(|word| match self.index_of(word) {
                Some(idx) if (idx as usize) < vocab_size => Some(idx),
                _ => oov,
            })
            .collect()
    }
}

/// Vocabulary lookup with post-padding and post-truncation
#[derive(Debug, Clone)]
pub struct SequenceEncoder {
    vocabulary: Vocabulary,
    max_length: usize,
    vocab_size: usize,
}

impl SequenceEncoder {
    pub fn new(vocabulary: Vocabulary, max_length: usize, vocab_size: usize) -> Self {
        Self {
            vocabulary,
            max_length,
            vocab_size,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

impl Encoder for SequenceEncoder {
    fn encode(&self, text: &CanonicalText) -> EncodedSequence {
        let mut ids = self.vocabulary.texts_to_sequence(text.words(), self.vocab_size);
        ids.truncate(self.max_length);
        ids.resize(self.max_length, PAD_INDEX);
        EncodedSequence(ids)
    }

    fn max_length(&self) -> usize {
        self.max_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use std::io::Write;

    fn vocabulary() -> Vocabulary {
        let word_index = [(OOV_TOKEN, 1), ("the", 2), ("report", 3), ("shocking", 4), ("rare", 9)]
            .into_iter()
            .map(|(w, i)| (w.to_string(), i))
            .collect();
        Vocabulary::new(word_index, Some(OOV_TOKEN.to_string())).expect("valid vocabulary")
    }

    #[test]
    fn test_post_padding() {
        let encoder = SequenceEncoder::new(vocabulary(), 6, 100);
        let seq = encoder.encode(&normalize("The SHOCKING report"));

        assert_eq!(seq.as_slice(), &[2, 4, 3, 0, 0, 0]);
        assert_eq!(seq.len(), 6);
        assert_eq!(seq.token_count(), 3);
    }

    #[test]
    fn test_post_truncation_keeps_head() {
        let encoder = SequenceEncoder::new(vocabulary(), 2, 100);
        let seq = encoder.encode(&normalize("the report the report"));
        assert_eq!(seq.as_slice(), &[2, 3]);
    }

    #[test]
    fn test_unknown_and_rare_words_map_to_oov() {
        let encoder = SequenceEncoder::new(vocabulary(), 4, 5);
        let seq = encoder.encode(&normalize("the unheard rare"));
        // "rare" has index 9 >= vocab_size 5
        assert_eq!(seq.as_slice(), &[2, 1, 1, 0]);
    }

    #[test]
    fn test_without_oov_unknown_words_are_dropped() {
        let word_index = [("the", 1), ("report", 2)]
            .into_iter()
            .map(|(w, i)| (w.to_string(), i))
            .collect();
        let encoder = SequenceEncoder::new(Vocabulary::new(word_index, None).unwrap(), 3, 100);
        let seq = encoder.encode(&normalize("the missing report"));
        assert_eq!(seq.as_slice(), &[1, 2, 0]);
    }

    #[test]
    fn test_empty_text_is_all_padding() {
        let encoder = SequenceEncoder::new(vocabulary(), 5, 100);
        let seq = encoder.encode(&normalize("   "));
        assert_eq!(seq.as_slice(), &[0; 5]);
        assert_eq!(seq.token_count(), 0);
    }

    #[test]
    fn test_rejects_padding_index_and_missing_oov() {
        let padded = [("the".to_string(), 0)].into_iter().collect();
        assert!(Vocabulary::new(padded, None).is_err());

        let no_oov = [("the".to_string(), 1)].into_iter().collect();
        assert!(Vocabulary::new(no_oov, Some(OOV_TOKEN.to_string())).is_err());
    }

    #[test]
    fn test_load_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"oov_token": "<OOV>", "word_index": {{"<OOV>": 1, "news": 2}}}}"#
        )
        .unwrap();

        let vocabulary = Vocabulary::from_json_file(file.path()).unwrap();
        assert_eq!(vocabulary.len(), 2);
        assert_eq!(vocabulary.index_of("news"), Some(2));
        assert_eq!(vocabulary.oov_index(), Some(1));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = Vocabulary::from_json_file(Path::new("/nonexistent/tokenizer.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("tokenizer.json"));
    }
}
