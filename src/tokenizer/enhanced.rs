use std::fmt::{self, Debug};

use rust_stemmers::{Algorithm, Stemmer};
use unicode_segmentation::UnicodeSegmentation;

use super::{stopwords::ENGLISH_SET, Tokenizer, TokenizerBackend};

/// Richer tokenizer
///
/// Word and sentence boundaries follow Unicode segmentation (UAX #29).
/// Only purely alphanumeric words survive, stop words are dropped before
/// stemming, and the remaining words are reduced with the Snowball English
/// stemmer when stemming is on.
pub struct EnhancedTokenizer {
    stemmer: Option<Stemmer>,
}

impl EnhancedTokenizer {
    pub fn new(stemming: bool) -> Self {
        Self {
            stemmer: stemming.then(|| Stemmer::create(Algorithm::English)),
        }
    }

    pub fn is_stemming(&self) -> bool {
        self.stemmer.is_some()
    }
}

impl Debug for EnhancedTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnhancedTokenizer")
            .field("stemming", &self.is_stemming())
            .finish()
    }
}

impl Tokenizer for EnhancedTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        lowered
            .unicode_words()
            .filter(|w| w.chars().all(char::is_alphanumeric))
            .filter(|w| !ENGLISH_SET.contains(w))
            .map(|w| match &self.stemmer {
                Some(stemmer) => stemmer.stem(w).into_owned(),
                None => w.to_string(),
            })
            .collect()
    }

    fn split_sentences(&self, text: &str) -> Vec<String> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn backend(&self) -> TokenizerBackend {
        TokenizerBackend::Enhanced
    }
}
