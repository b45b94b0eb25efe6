//! Document consistency analysis over a TF-IDF vector space.
//!
//! Finds near-duplicate passages, likely contradictions and competing
//! terminology across a corpus of natural-language documents.
pub mod analyzer;
pub mod config;
pub mod contradiction;
pub mod error;
pub mod report;
pub mod similarity;
pub mod terminology;
pub mod tokenizer;
pub mod utils;
pub mod vectorizer;

/// Document Analyzer
/// The top-level entry point of this crate.
/// It ingests `(text, source)` inputs and runs the whole pipeline:
/// - phase 1: corpus statistics (document frequency, IDF)
/// - phase 2: TF-IDF vectors, pairwise similarity, contradiction checks
/// - terminology analysis over the raw text
///
/// The result is a serializable [`Report`].
pub use analyzer::DocumentAnalyzer;

/// Analyzer configuration
/// Every option has a default; `from_toml` parses and validates a TOML
/// document.
pub use config::AnalyzerConfig;

/// Error type and result alias used by every fallible operation
pub use error::{Error, Result};

/// Analysis report and its parts
pub use report::{DuplicateFinding, Report, ReportStatistics};

/// Tokenizer contract and its two backends
/// The backend is chosen once from `TokenizerConfig::build` and shared as
/// `Arc<dyn Tokenizer>`.
pub use tokenizer::{BasicTokenizer, EnhancedTokenizer, Tokenizer, TokenizerBackend, TokenizerConfig};

/// Corpus statistics
/// `CorpusBuilder` accumulates document frequencies; `finish` freezes them
/// into an immutable `CorpusStatistics` with a fresh snapshot number.
/// Vectors are only comparable when built from the same snapshot.
///
/// # Serialization
/// Supported, as CBOR via `to_cbor` / `from_cbor`.
pub use vectorizer::corpus::{CorpusBuilder, CorpusStatistics};

/// Token Frequency structure
/// Counts the occurrences of each token within one document.
/// Used as base data for TF (Term Frequency) calculation.
pub use vectorizer::token::TokenFrequency;

/// TF IDF Calculation Engine Trait
/// A trait that defines the behavior of a TF-IDF calculation engine.
///
/// By implementing this trait, you can plug different TF-IDF calculation strategies
/// into `Vectorizer<N, E>`.
/// The default implementation, `DefaultTFIDFEngine`, normalises TF by the
/// most frequent token and supports f32 and f64 weights.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, IdfMode, TFIDFEngine};

/// TF-IDF Vectorizer and its inputs and outputs
pub use vectorizer::{DocId, Document, SourceId, TermVector, Vectorizer};

/// Pairwise similarity sweep and banding
pub use similarity::{Band, ContradictionBand, SimilarityEngine, SimilarityPair, Thresholds};

/// Contradiction heuristics
pub use contradiction::{
    ContradictionDetector, ContradictionKind, ContradictionRecord, Evidence, PatternSpec, PatternTable,
};

/// Terminology consistency
pub use terminology::{Glossary, TermUsage, TerminologyAnalyzer, TerminologyGroup};

/// Cooperative cancellation for the pair sweeps
pub use utils::cancel::CancelToken;
