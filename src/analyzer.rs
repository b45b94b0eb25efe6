//! End-to-end pipeline.
//!
//! Phase 1 turns the whole corpus into frozen [`CorpusStatistics`]. Phase 2
//! vectorizes every document against those statistics, sweeps all pairs and
//! runs the detectors. The terminology pass reads the raw documents directly.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::{
    config::AnalyzerConfig,
    contradiction::{ContradictionDetector, PatternTable},
    error::Result,
    report::{DuplicateFinding, Report, ReportStatistics},
    similarity::{Band, SimilarityEngine},
    terminology::TerminologyAnalyzer,
    tokenizer::Tokenizer,
    utils::{cancel::CancelToken, text::excerpt},
    vectorizer::{corpus::CorpusStatistics, Document, Vectorizer},
};

/// Document Analyzer
///
/// Built once from a validated [`AnalyzerConfig`]; the tokenizer, antonym
/// table and glossary regexes are compiled at construction and reused for
/// every run.
///
/// ```
/// use doc_consistency::{AnalyzerConfig, DocumentAnalyzer};
///
/// let analyzer = DocumentAnalyzer::new(AnalyzerConfig::default()).unwrap();
/// let report = analyzer
///     .analyze([
///         ("Set the config value before start.", "setup.md"),
///         ("The configuration is read once.", "runtime.md"),
///     ])
///     .unwrap();
/// assert_eq!(report.terminology_issues.len(), 1);
/// assert_eq!(report.statistics.file_count, 2);
/// ```
#[derive(Debug, Clone)]
pub struct DocumentAnalyzer {
    config: AnalyzerConfig,
    tokenizer: Arc<dyn Tokenizer>,
    patterns: PatternTable,
    terminology: TerminologyAnalyzer,
}

impl DocumentAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let tokenizer = config.tokenizer.build();
        let patterns = config.pattern_table()?;
        let terminology = TerminologyAnalyzer::new(&config.glossary)?;
        Ok(Self {
            config,
            tokenizer,
            patterns,
            terminology,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Tokenize ordered `(text, source)` inputs into documents
    pub fn ingest<I, T, S>(&self, inputs: I) -> Vec<Document>
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: AsRef<str>,
    {
        Document::from_inputs(inputs, self.tokenizer.as_ref())
    }

    pub fn analyze<I, T, S>(&self, inputs: I) -> Result<Report>
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: AsRef<str>,
    {
        self.analyze_with_cancel(inputs, &CancelToken::new())
    }

    pub fn analyze_with_cancel<I, T, S>(&self, inputs: I, cancel: &CancelToken) -> Result<Report>
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: AsRef<str>,
    {
        let docs = self.ingest(inputs);
        self.analyze_documents(&docs, cancel)
    }

    /// Run both phases over already ingested documents
    ///
    /// An empty corpus fails with [`crate::Error::EmptyCorpus`] before any
    /// later stage runs.
    pub fn analyze_documents(&self, docs: &[Document], cancel: &CancelToken) -> Result<Report> {
        info!(documents = docs.len(), backend = self.tokenizer.backend().name(), "analysis started");

        // phase 1
        let stats = Arc::new(CorpusStatistics::build(docs, self.config.idf_mode())?);
        info!(vocabulary = stats.vocab_size(), snapshot = stats.snapshot(), "corpus statistics built");

        // phase 2
        let vectorizer: Vectorizer<f64> = Vectorizer::new(Arc::clone(&stats));
        let vectors = vectorizer.vectorize_all(docs);
        let pairs = SimilarityEngine::new(self.config.thresholds())
            .exclude_same_source(self.config.exclude_same_source)
            .batch_rows(self.config.batch_rows)
            .compare_all_with_cancel(&vectors, cancel)?;

        let duplicates: Vec<DuplicateFinding> = pairs
            .iter()
            .filter(|p| p.band == Band::Duplicate)
            .filter_map(|p| {
                let a = Document::find(docs, p.doc_a)?;
                let b = Document::find(docs, p.doc_b)?;
                Some(DuplicateFinding {
                    pair: *p,
                    source_a: Arc::clone(&a.source_id),
                    source_b: Arc::clone(&b.source_id),
                    excerpt_a: excerpt(&a.raw_text, self.config.excerpt_chars),
                    excerpt_b: excerpt(&b.raw_text, self.config.excerpt_chars),
                })
            })
            .collect();

        let detector = ContradictionDetector::new(self.patterns.clone(), Arc::clone(&self.tokenizer))
            .numeric_overlap_threshold(self.config.numeric_overlap_threshold)
            .excerpt_chars(self.config.excerpt_chars, self.config.sentence_excerpt_chars)
            .sentence_excludes_same_source(self.config.sentence_pass_excludes_same_source)
            .batch_rows(self.config.batch_rows);
        let mut contradictions = detector.detect_candidates(&pairs, docs);
        if self.config.sentence_level {
            contradictions.extend(detector.sweep_sentences(docs, cancel)?);
        }

        let terminology_issues = self.terminology.analyze(docs);

        let statistics = ReportStatistics {
            document_count: docs.len(),
            file_count: docs.iter().map(|d| &d.source_id).collect::<BTreeSet<_>>().len(),
            vocabulary_size: stats.vocab_size(),
            tokenizer: self.tokenizer.backend(),
        };
        info!(
            duplicates = duplicates.len(),
            contradictions = contradictions.len(),
            terminology = terminology_issues.len(),
            "analysis finished"
        );

        Ok(Report {
            duplicates,
            contradictions,
            terminology_issues,
            statistics,
        })
    }
}
