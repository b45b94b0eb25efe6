use once_cell::sync::Lazy;
use regex::Regex;

use super::{stopwords::BASIC_SET, Tokenizer, TokenizerBackend};

static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Fallback tokenizer
///
/// Lowercases, blanks out everything that is neither a word character nor
/// whitespace, splits on whitespace and drops [`super::stopwords::BASIC`].
#[derive(Debug, Default, Clone)]
pub struct BasicTokenizer;

impl BasicTokenizer {
    pub fn new() -> Self {
        BasicTokenizer
    }
}

impl Tokenizer for BasicTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let cleaned = NON_WORD_RE.replace_all(&lowered, " ");
        cleaned
            .split_whitespace()
            .filter(|t| !BASIC_SET.contains(t))
            .map(str::to_string)
            .collect()
    }

    fn split_sentences(&self, text: &str) -> Vec<String> {
        SENTENCE_END_RE
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn backend(&self) -> TokenizerBackend {
        TokenizerBackend::Basic
    }
}
