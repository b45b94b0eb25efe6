//! Text normalisation: raw text into tokens and sentences.
//!
//! Two backends share the [`Tokenizer`] trait. The backend is picked once
//! from [`TokenizerConfig::build`] and the rest of the pipeline only sees
//! `Arc<dyn Tokenizer>`.

pub mod basic;
pub mod enhanced;
pub mod stopwords;

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use basic::BasicTokenizer;
pub use enhanced::EnhancedTokenizer;

/// Tokenizer contract
///
/// Implementations are pure: the same text always yields the same tokens.
/// Empty or punctuation-only input yields an empty sequence, never an error.
pub trait Tokenizer: Send + Sync + Debug {
    /// Lowercased, stop-word filtered tokens of `text`
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Trimmed, non-empty sentences of `text`
    fn split_sentences(&self, text: &str) -> Vec<String>;

    /// Which backend this is
    fn backend(&self) -> TokenizerBackend;
}

/// Tokenizer backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerBackend {
    /// Regex word splitting with a short stop-word list
    #[default]
    Basic,
    /// Unicode segmentation, full English stop words, optional stemming
    Enhanced,
}

impl TokenizerBackend {
    pub fn name(&self) -> &'static str {
        match self {
            TokenizerBackend::Basic => "basic",
            TokenizerBackend::Enhanced => "enhanced",
        }
    }
}

/// Tokenizer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub backend: TokenizerBackend,
    /// Only honoured by the enhanced backend
    pub stemming: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            backend: TokenizerBackend::Basic,
            stemming: true,
        }
    }
}

impl TokenizerConfig {
    /// Build the configured tokenizer
    pub fn build(&self) -> Arc<dyn Tokenizer> {
        tracing::debug!(backend = self.backend.name(), stemming = self.stemming, "tokenizer selected");
        match self.backend {
            TokenizerBackend::Basic => Arc::new(BasicTokenizer::new()),
            TokenizerBackend::Enhanced => Arc::new(EnhancedTokenizer::new(self.stemming)),
        }
    }
}
