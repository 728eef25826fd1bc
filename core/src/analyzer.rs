use crate::ngram::{generate_ngrams, MAX_NGRAM};
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Longest n-gram to emit, clamped to 1..=3.
    pub max_ngram: usize,
    /// Apply NFKC normalization before tokenizing.
    #[serde(default)]
    pub nfkc: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { max_ngram: MAX_NGRAM, nfkc: false }
    }
}

/// Text → index terms. Documents and queries must go through the same analyzer.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn tokens(&self, text: &str) -> Vec<String> {
        if self.config.nfkc {
            tokenize(&text.nfkc().collect::<String>())
        } else {
            tokenize(text)
        }
    }

    /// All n-gram terms of `text`, repetitions included.
    pub fn terms(&self, text: &str) -> Vec<String> {
        generate_ngrams(&self.tokens(text), self.config.max_ngram)
    }
}
