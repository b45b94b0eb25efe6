//! Contradiction heuristics over moderately similar documents.
//!
//! Two whole-document checks run on each contradiction-candidate pair: a
//! lexical antonym table and a numeric-literal conflict check. A separate
//! sentence-level sweep applies the antonym table to every cross-document
//! sentence pair, regardless of the whole-document score.
//!
//! These are heuristics. A miss is a quality issue, never an error.

pub mod numeric;
pub mod patterns;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    similarity::{Band, SimilarityPair},
    tokenizer::Tokenizer,
    utils::{cancel::CancelToken, text::excerpt},
    vectorizer::{DocId, Document},
};

pub use patterns::{AntonymPattern, MatchMask, PatternSpec, PatternTable};

/// A sentence with the rules it already matched
type ScannedSentence = (String, MatchMask);

/// Which check produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    LexicalAntonym,
    NumericConflict,
    SentenceLevel,
}

impl fmt::Display for ContradictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContradictionKind::LexicalAntonym => "lexical antonym",
            ContradictionKind::NumericConflict => "numeric conflict",
            ContradictionKind::SentenceLevel => "sentence level",
        };
        f.write_str(s)
    }
}

/// Truncated text of both sides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub text_a: String,
    pub text_b: String,
}

/// One suspected contradiction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionRecord {
    pub doc_a: DocId,
    pub doc_b: DocId,
    /// Whole-document similarity; `None` for sentence-level records
    pub similarity: Option<f64>,
    pub kind: ContradictionKind,
    /// Pattern label such as `required/optional`, or `30 vs 60`
    pub rule: String,
    pub evidence: Evidence,
}

/// Contradiction Detector
#[derive(Debug, Clone)]
pub struct ContradictionDetector {
    patterns: PatternTable,
    tokenizer: Arc<dyn Tokenizer>,
    pub numeric_overlap_threshold: f64,
    pub excerpt_chars: usize,
    pub sentence_excerpt_chars: usize,
    pub sentence_excludes_same_source: bool,
    pub batch_rows: usize,
}

impl ContradictionDetector {
    pub fn new(patterns: PatternTable, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            patterns,
            tokenizer,
            numeric_overlap_threshold: 0.5,
            excerpt_chars: 300,
            sentence_excerpt_chars: 200,
            sentence_excludes_same_source: true,
            batch_rows: 64,
        }
    }

    pub fn numeric_overlap_threshold(mut self, threshold: f64) -> Self {
        self.numeric_overlap_threshold = threshold;
        self
    }

    pub fn excerpt_chars(mut self, document: usize, sentence: usize) -> Self {
        self.excerpt_chars = document;
        self.sentence_excerpt_chars = sentence;
        self
    }

    pub fn sentence_excludes_same_source(mut self, exclude: bool) -> Self {
        self.sentence_excludes_same_source = exclude;
        self
    }

    pub fn batch_rows(mut self, rows: usize) -> Self {
        self.batch_rows = rows.max(1);
        self
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    /// Whole-document checks on one pair
    ///
    /// At most one record per check: the first antonym rule that fires, then
    /// the numeric conflict if any.
    pub fn detect(&self, pair: &SimilarityPair, doc_a: &Document, doc_b: &Document) -> Vec<ContradictionRecord> {
        let mask_a = self.patterns.scan(&doc_a.raw_text);
        let mask_b = self.patterns.scan(&doc_b.raw_text);
        self.detect_scanned(pair, (doc_a, &mask_a), (doc_b, &mask_b))
    }

    fn detect_scanned(
        &self,
        pair: &SimilarityPair,
        (doc_a, mask_a): (&Document, &MatchMask),
        (doc_b, mask_b): (&Document, &MatchMask),
    ) -> Vec<ContradictionRecord> {
        let mut records = Vec::new();
        let evidence = || Evidence {
            text_a: excerpt(&doc_a.raw_text, self.excerpt_chars),
            text_b: excerpt(&doc_b.raw_text, self.excerpt_chars),
        };

        if let Some(pattern) = self.patterns.opposition(mask_a, mask_b) {
            records.push(ContradictionRecord {
                doc_a: pair.doc_a,
                doc_b: pair.doc_b,
                similarity: Some(pair.score),
                kind: ContradictionKind::LexicalAntonym,
                rule: pattern.label.clone(),
                evidence: evidence(),
            });
        }

        if let Some(rule) = numeric::numeric_conflict(
            &doc_a.raw_text,
            &doc_a.tokens,
            &doc_b.raw_text,
            &doc_b.tokens,
            self.numeric_overlap_threshold,
        ) {
            records.push(ContradictionRecord {
                doc_a: pair.doc_a,
                doc_b: pair.doc_b,
                similarity: Some(pair.score),
                kind: ContradictionKind::NumericConflict,
                rule,
                evidence: evidence(),
            });
        }
        records
    }

    /// Run [`Self::detect`] over every contradiction-candidate pair
    ///
    /// Each document taking part is scanned once, however many pairs it is
    /// in. Pairs whose ids are not found in `docs` are skipped. Output keeps
    /// the order of `pairs`.
    pub fn detect_candidates(&self, pairs: &[SimilarityPair], docs: &[Document]) -> Vec<ContradictionRecord> {
        let candidates: Vec<&SimilarityPair> = pairs
            .iter()
            .filter(|p| p.band == Band::ContradictionCandidate)
            .collect();
        let mut involved: Vec<DocId> = candidates.iter().flat_map(|p| [p.doc_a, p.doc_b]).collect();
        involved.sort_unstable();
        involved.dedup();
        let masks: HashMap<DocId, MatchMask> = involved
            .par_iter()
            .filter_map(|&id| Document::find(docs, id).map(|d| (id, self.patterns.scan(&d.raw_text))))
            .collect();

        let records: Vec<ContradictionRecord> = candidates
            .par_iter()
            .flat_map_iter(|p| {
                let side = |id| Document::find(docs, id).zip(masks.get(&id));
                match (side(p.doc_a), side(p.doc_b)) {
                    (Some(a), Some(b)) => self.detect_scanned(p, a, b),
                    _ => Vec::new(),
                }
            })
            .collect();
        info!(records = records.len(), "document-level contradiction checks finished");
        records
    }

    /// Antonym check over every cross-document sentence pair of two documents
    pub fn detect_sentences(&self, doc_a: &Document, doc_b: &Document) -> Vec<ContradictionRecord> {
        let sentences_a = self.scan_sentences(doc_a);
        let sentences_b = self.scan_sentences(doc_b);
        self.sentence_records(doc_a, &sentences_a, doc_b, &sentences_b)
    }

    fn scan_sentences(&self, doc: &Document) -> Vec<ScannedSentence> {
        self.tokenizer
            .split_sentences(&doc.raw_text)
            .into_iter()
            .map(|s| {
                let mask = self.patterns.scan(&s);
                (s, mask)
            })
            .collect()
    }

    /// Sentence-level pass over every document pair
    ///
    /// Sentences of each document are split and scanned against the rule
    /// table once up front, so a sentence pair costs a mask comparison. Rows
    /// of the pair space run in rayon batches with a cancellation point
    /// between batches.
    pub fn sweep_sentences(&self, docs: &[Document], cancel: &CancelToken) -> Result<Vec<ContradictionRecord>> {
        let n = docs.len();
        let sentences: Vec<Vec<ScannedSentence>> = docs.par_iter().map(|d| self.scan_sentences(d)).collect();
        info!(
            documents = n,
            sentences = sentences.iter().map(Vec::len).sum::<usize>(),
            "sentence sweep started"
        );

        let rows: Vec<usize> = (0..n.saturating_sub(1)).collect();
        let mut records = Vec::new();
        let mut completed_rows = 0;
        for batch in rows.chunks(self.batch_rows.max(1)) {
            if cancel.is_cancelled() {
                warn!(completed_rows, "sentence sweep cancelled");
                return Err(Error::Cancelled { completed_rows });
            }
            let found: Vec<ContradictionRecord> = batch
                .par_iter()
                .flat_map_iter(|&i| {
                    (i + 1..n)
                        .filter(move |&j| {
                            !(self.sentence_excludes_same_source && docs[i].source_id == docs[j].source_id)
                        })
                        .flat_map(|j| self.sentence_records(&docs[i], &sentences[i], &docs[j], &sentences[j]))
                        .collect::<Vec<_>>()
                })
                .collect();
            completed_rows += batch.len();
            debug!(completed_rows, found = found.len(), "sentence batch done");
            records.extend(found);
        }

        info!(records = records.len(), "sentence sweep finished");
        Ok(records)
    }

    fn sentence_records(
        &self,
        doc_a: &Document,
        sentences_a: &[ScannedSentence],
        doc_b: &Document,
        sentences_b: &[ScannedSentence],
    ) -> Vec<ContradictionRecord> {
        let mut records = Vec::new();
        for (sa, mask_a) in sentences_a.iter().filter(|(_, m)| !m.is_empty()) {
            for (sb, mask_b) in sentences_b {
                if let Some(pattern) = self.patterns.opposition(mask_a, mask_b) {
                    records.push(ContradictionRecord {
                        doc_a: doc_a.id,
                        doc_b: doc_b.id,
                        similarity: None,
                        kind: ContradictionKind::SentenceLevel,
                        rule: pattern.label.clone(),
                        evidence: Evidence {
                            text_a: excerpt(sa, self.sentence_excerpt_chars),
                            text_b: excerpt(sb, self.sentence_excerpt_chars),
                        },
                    });
                }
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::BasicTokenizer;

    fn detector() -> ContradictionDetector {
        ContradictionDetector::new(PatternTable::default(), Arc::new(BasicTokenizer::new()))
    }

    fn docs(inputs: &[(&str, &str)]) -> Vec<Document> {
        Document::from_inputs(inputs.iter().copied(), &BasicTokenizer::new())
    }

    fn candidate(a: usize, b: usize) -> SimilarityPair {
        SimilarityPair {
            doc_a: DocId(a),
            doc_b: DocId(b),
            score: 0.5,
            band: Band::ContradictionCandidate,
        }
    }

    #[test]
    fn required_vs_optional_is_a_lexical_antonym() {
        let d = docs(&[("Deployment is required.", "a.md"), ("Deployment is optional.", "b.md")]);
        let records = detector().detect(&candidate(0, 1), &d[0], &d[1]);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.kind, ContradictionKind::LexicalAntonym);
        assert_eq!(r.rule, "required/optional");
        assert_eq!(r.similarity, Some(0.5));
        assert_eq!(r.evidence.text_a, "Deployment is required.");
    }

    #[test]
    fn differing_timeouts_are_a_numeric_conflict() {
        let d = docs(&[("Timeout is 30 seconds.", "a.md"), ("Timeout is 60 seconds.", "b.md")]);
        let records = detector().detect(&candidate(0, 1), &d[0], &d[1]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, ContradictionKind::NumericConflict);
        assert_eq!(records[0].rule, "30 vs 60");
    }

    #[test]
    fn both_checks_can_fire_once_each() {
        let d = docs(&[
            ("Retries are required, limit 3.", "a.md"),
            ("Retries are optional, limit 5.", "b.md"),
        ]);
        let kinds: Vec<_> = detector()
            .detect(&candidate(0, 1), &d[0], &d[1])
            .into_iter()
            .map(|r| r.kind)
            .collect();
        assert_eq!(kinds, vec![ContradictionKind::LexicalAntonym, ContradictionKind::NumericConflict]);
    }

    #[test]
    fn only_candidate_pairs_are_checked() {
        let d = docs(&[("Deployment is required.", "a.md"), ("Deployment is optional.", "b.md")]);
        let mut dup = candidate(0, 1);
        dup.band = Band::Duplicate;
        assert!(detector().detect_candidates(&[dup], &d).is_empty());
        assert_eq!(detector().detect_candidates(&[candidate(0, 1)], &d).len(), 1);
    }

    #[test]
    fn sentence_level_finds_buried_conflicts() {
        let d = docs(&[
            ("The cache lives in memory. Signing is always on.", "a.md"),
            ("Builds run nightly. Signing is never on!", "b.md"),
        ]);
        let records = detector().detect_sentences(&d[0], &d[1]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, ContradictionKind::SentenceLevel);
        assert_eq!(records[0].rule, "always/never");
        assert_eq!(records[0].similarity, None);
        assert_eq!(records[0].evidence.text_a, "Signing is always on");
    }

    #[test]
    fn sweep_skips_same_source_by_default() {
        let d = docs(&[
            ("Signing is always on.", "a.md"),
            ("Signing is never on.", "a.md"),
            ("Signing is never on.", "b.md"),
        ]);
        let records = detector().sweep_sentences(&d, &CancelToken::new()).unwrap();
        let pairs: Vec<_> = records.iter().map(|r| (r.doc_a, r.doc_b)).collect();
        assert_eq!(pairs, vec![(DocId(0), DocId(2))]);

        let records = detector()
            .sentence_excludes_same_source(false)
            .sweep_sentences(&d, &CancelToken::new())
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn sweep_matches_pairwise_sentence_checks() {
        let d = docs(&[
            ("Signing is always on. Retries are required. Builds run nightly.", "a.md"),
            ("Signing is never on. Retries are optional.", "b.md"),
            ("Clients must sync. Nothing else here.", "c.md"),
            ("Clients must not sync.", "d.md"),
        ]);
        let det = detector();
        let swept = det.sweep_sentences(&d, &CancelToken::new()).unwrap();
        let mut pairwise = Vec::new();
        for i in 0..d.len() {
            for j in i + 1..d.len() {
                pairwise.extend(det.detect_sentences(&d[i], &d[j]));
            }
        }
        assert_eq!(swept, pairwise);
        let rules: Vec<_> = swept.iter().map(|r| (r.doc_a.0, r.doc_b.0, r.rule.as_str())).collect();
        assert_eq!(
            rules,
            vec![(0, 1, "always/never"), (0, 1, "required/optional"), (2, 3, "must/must not")]
        );
    }

    #[test]
    fn candidates_sharing_a_document_match_single_detects() {
        let d = docs(&[
            ("Deployment is required.", "a.md"),
            ("Deployment is optional.", "b.md"),
            ("Deployment is optional, always.", "c.md"),
        ]);
        let det = detector();
        let pairs = [candidate(0, 1), candidate(0, 2), candidate(1, 2)];
        let batched = det.detect_candidates(&pairs, &d);
        let single: Vec<_> = pairs
            .iter()
            .flat_map(|p| det.detect(p, &d[p.doc_a.0], &d[p.doc_b.0]))
            .collect();
        assert_eq!(batched, single);
        assert_eq!(batched.len(), 2);
    }

    #[test]
    fn sweep_honours_cancellation() {
        let d = docs(&[("Signing is always on.", "a.md"), ("Signing is never on.", "b.md")]);
        let token = CancelToken::new();
        token.cancel();
        let err = detector().sweep_sentences(&d, &token).unwrap_err();
        assert!(matches!(err, Error::Cancelled { .. }));
    }
}
