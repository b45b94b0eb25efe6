//! Analyzer configuration.
//!
//! Every option has a compiled-in default, so an empty TOML document is a
//! valid configuration:
//!
//! ```toml
//! duplicate_threshold = 0.8
//! idf_smoothing = true
//!
//! [contradiction_band]
//! low = 0.25
//! high = 0.7
//!
//! [tokenizer]
//! backend = "enhanced"
//!
//! [[antonym_patterns]]
//! label = "on/off"
//! positive = '\bon\b'
//! negative = '\boff\b'
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    contradiction::{patterns::default_specs, PatternSpec, PatternTable},
    error::{Error, Result},
    similarity::{ContradictionBand, Thresholds},
    terminology::Glossary,
    tokenizer::TokenizerConfig,
    vectorizer::tfidf::IdfMode,
};

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Pairs scoring strictly above this are duplicates
    pub duplicate_threshold: f64,
    pub contradiction_band: ContradictionBand,
    /// `ln(N / (df + 1))` instead of `ln(N / df)`
    pub idf_smoothing: bool,
    pub tokenizer: TokenizerConfig,
    pub numeric_overlap_threshold: f64,
    pub glossary: Glossary,
    pub exclude_same_source: bool,
    /// Run the sentence-level contradiction sweep
    pub sentence_level: bool,
    pub sentence_pass_excludes_same_source: bool,
    /// Extra or replacement antonym rules
    pub antonym_patterns: Option<Vec<PatternSpec>>,
    /// Append `antonym_patterns` to the built-in table instead of replacing it
    pub extend_default_patterns: bool,
    pub excerpt_chars: usize,
    pub sentence_excerpt_chars: usize,
    /// Rows of the pair space per parallel batch
    pub batch_rows: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: 0.75,
            contradiction_band: ContradictionBand { low: 0.3, high: 0.7 },
            idf_smoothing: false,
            tokenizer: TokenizerConfig::default(),
            numeric_overlap_threshold: 0.5,
            glossary: Glossary::default(),
            exclude_same_source: true,
            sentence_level: true,
            sentence_pass_excludes_same_source: true,
            antonym_patterns: None,
            extend_default_patterns: true,
            excerpt_chars: 300,
            sentence_excerpt_chars: 200,
            batch_rows: 64,
        }
    }
}

impl AnalyzerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks, first failing field wins
    pub fn validate(&self) -> Result<()> {
        if !(self.duplicate_threshold > 0.0 && self.duplicate_threshold <= 1.0) {
            return Err(Error::invalid_config(
                "duplicate_threshold",
                format!("must be in (0, 1], got {}", self.duplicate_threshold),
            ));
        }
        let band = self.contradiction_band;
        if !(0.0 <= band.low && band.low < band.high && band.high <= 1.0) {
            return Err(Error::invalid_config(
                "contradiction_band",
                format!("need 0 <= low < high <= 1, got ({}, {})", band.low, band.high),
            ));
        }
        if !(0.0..=1.0).contains(&self.numeric_overlap_threshold) {
            return Err(Error::invalid_config(
                "numeric_overlap_threshold",
                format!("must be in [0, 1], got {}", self.numeric_overlap_threshold),
            ));
        }
        if self.batch_rows == 0 {
            return Err(Error::invalid_config("batch_rows", "must be greater than 0"));
        }
        self.glossary.validate()
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            duplicate: self.duplicate_threshold,
            contradiction_band: self.contradiction_band,
        }
    }

    pub fn idf_mode(&self) -> IdfMode {
        IdfMode::from_smoothing(self.idf_smoothing)
    }

    /// Compile the effective antonym table
    pub fn pattern_table(&self) -> Result<PatternTable> {
        match &self.antonym_patterns {
            None => Ok(PatternTable::default()),
            Some(extra) if self.extend_default_patterns => {
                let mut table = PatternTable::default();
                table.extend_from_specs(extra)?;
                Ok(table)
            }
            Some(replacement) => PatternTable::from_specs(replacement),
        }
    }

    /// The built-in antonym rules, for writing out a starting config
    pub fn default_patterns() -> Vec<PatternSpec> {
        default_specs()
    }
}
