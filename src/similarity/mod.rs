//! Pairwise comparison of every document vector.
//!
//! Cost is O(n²·k) for n documents with k non-zero weights on average. This
//! sweep dominates the whole pipeline, so size corpora against it.

use std::fmt;

use num::Num;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    utils::cancel::CancelToken,
    vectorizer::{
        compute::compare::{Compare, DefaultCompare},
        DocId, TermVector,
    },
};

/// Similarity band of a document pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// score above the duplicate threshold
    Duplicate,
    /// score strictly inside the contradiction band
    ContradictionCandidate,
    Unrelated,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Band::Duplicate => "duplicate",
            Band::ContradictionCandidate => "contradiction-candidate",
            Band::Unrelated => "unrelated",
        };
        f.write_str(s)
    }
}

/// One classified, unordered document pair (`doc_a < doc_b`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityPair {
    pub doc_a: DocId,
    pub doc_b: DocId,
    pub score: f64,
    pub band: Band,
}

/// Open interval `(low, high)` searched for contradictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContradictionBand {
    pub low: f64,
    pub high: f64,
}

impl ContradictionBand {
    #[inline]
    pub fn contains(&self, score: f64) -> bool {
        self.low < score && score < self.high
    }
}

/// Band thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub duplicate: f64,
    pub contradiction_band: ContradictionBand,
}

impl Thresholds {
    /// Duplicate wins over the contradiction band when both match
    #[inline]
    pub fn classify(&self, score: f64) -> Band {
        if score > self.duplicate {
            Band::Duplicate
        } else if self.contradiction_band.contains(score) {
            Band::ContradictionCandidate
        } else {
            Band::Unrelated
        }
    }
}

/// Similarity Engine
///
/// Compares every unordered pair of term vectors and keeps the pairs that land
/// in the duplicate or contradiction band.
///
/// Rows of the upper-triangular pair space are processed in batches of
/// `batch_rows`; every batch is sharded across rayon workers over the shared,
/// read-only vectors. The cancellation token is polled between batches.
/// Results are returned in row-major order regardless of scheduling.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    pub thresholds: Thresholds,
    pub exclude_same_source: bool,
    pub batch_rows: usize,
}

impl SimilarityEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            exclude_same_source: true,
            batch_rows: 64,
        }
    }

    pub fn exclude_same_source(mut self, exclude: bool) -> Self {
        self.exclude_same_source = exclude;
        self
    }

    pub fn batch_rows(mut self, rows: usize) -> Self {
        self.batch_rows = rows.max(1);
        self
    }

    /// Cosine similarity of one pair, in [0, 1]
    #[inline]
    pub fn pair_score<N>(a: &TermVector<N>, b: &TermVector<N>) -> f64
    where
        N: Num + Copy,
        DefaultCompare: Compare<N>,
    {
        DefaultCompare::term_vectors(a, b)
    }

    /// Compare all pairs without a cancellation point
    pub fn compare_all<N>(&self, vectors: &[TermVector<N>]) -> Result<Vec<SimilarityPair>>
    where
        N: Num + Copy + Send + Sync,
        DefaultCompare: Compare<N>,
    {
        self.compare_all_with_cancel(vectors, &CancelToken::new())
    }

    /// Compare all pairs, stopping with [`Error::Cancelled`] at the next
    /// batch boundary once `cancel` trips
    pub fn compare_all_with_cancel<N>(
        &self,
        vectors: &[TermVector<N>],
        cancel: &CancelToken,
    ) -> Result<Vec<SimilarityPair>>
    where
        N: Num + Copy + Send + Sync,
        DefaultCompare: Compare<N>,
    {
        let n = vectors.len();
        check_snapshot(vectors)?;
        let total_pairs = n.saturating_sub(1) * n / 2;
        info!(documents = n, pairs = total_pairs, "similarity sweep started");

        let rows: Vec<usize> = (0..n.saturating_sub(1)).collect();
        let mut pairs = Vec::new();
        let mut completed_rows = 0;
        for batch in rows.chunks(self.batch_rows.max(1)) {
            if cancel.is_cancelled() {
                warn!(completed_rows, "similarity sweep cancelled");
                return Err(Error::Cancelled { completed_rows });
            }
            let found: Vec<SimilarityPair> = batch
                .par_iter()
                .flat_map_iter(|&i| self.compare_row(vectors, i))
                .collect();
            completed_rows += batch.len();
            debug!(completed_rows, found = found.len(), "similarity batch done");
            pairs.extend(found);
        }

        info!(
            duplicates = pairs.iter().filter(|p| p.band == Band::Duplicate).count(),
            candidates = pairs.iter().filter(|p| p.band == Band::ContradictionCandidate).count(),
            "similarity sweep finished"
        );
        Ok(pairs)
    }

    /// All kept pairs `(i, j)` with `j > i`
    fn compare_row<'a, N>(&'a self, vectors: &'a [TermVector<N>], i: usize) -> impl Iterator<Item = SimilarityPair> + 'a
    where
        N: Num + Copy,
        DefaultCompare: Compare<N>,
    {
        let a = &vectors[i];
        vectors[i + 1..].iter().filter_map(move |b| {
            // a document is never paired with itself
            if a.doc == b.doc {
                return None;
            }
            if self.exclude_same_source && a.source == b.source {
                return None;
            }
            let score = Self::pair_score(a, b);
            let band = self.thresholds.classify(score);
            if band == Band::Unrelated {
                return None;
            }
            let (doc_a, doc_b) = if a.doc <= b.doc { (a.doc, b.doc) } else { (b.doc, a.doc) };
            Some(SimilarityPair {
                doc_a,
                doc_b,
                score,
                band,
            })
        })
    }
}

/// every vector must come from the same corpus snapshot
fn check_snapshot<N>(vectors: &[TermVector<N>]) -> Result<()>
where
    N: Num + Copy,
{
    let Some(first) = vectors.first() else {
        return Ok(());
    };
    match vectors.iter().find(|v| v.snapshot != first.snapshot) {
        Some(other) => Err(Error::SnapshotMismatch {
            expected: first.snapshot,
            found: other.snapshot,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tokenizer::BasicTokenizer;
    use crate::vectorizer::{corpus::CorpusStatistics, tfidf::IdfMode, Document, Vectorizer};

    fn thresholds() -> Thresholds {
        Thresholds {
            duplicate: 0.75,
            contradiction_band: ContradictionBand { low: 0.3, high: 0.7 },
        }
    }

    fn vectors(inputs: &[(&str, &str)]) -> Vec<TermVector<f64>> {
        let docs = Document::from_inputs(inputs.iter().copied(), &BasicTokenizer::new());
        let stats = Arc::new(CorpusStatistics::build(&docs, IdfMode::Standard).unwrap());
        Vectorizer::<f64>::new(stats).vectorize_all(&docs)
    }

    #[test]
    fn classify_bands() {
        let t = thresholds();
        assert_eq!(t.classify(0.9), Band::Duplicate);
        assert_eq!(t.classify(0.75), Band::Unrelated);
        assert_eq!(t.classify(0.5), Band::ContradictionCandidate);
        assert_eq!(t.classify(0.3), Band::Unrelated);
        assert_eq!(t.classify(0.0), Band::Unrelated);
    }

    #[test]
    fn duplicate_wins_over_overlapping_band() {
        let t = Thresholds {
            duplicate: 0.6,
            contradiction_band: ContradictionBand { low: 0.3, high: 0.9 },
        };
        assert_eq!(t.classify(0.8), Band::Duplicate);
    }

    #[test]
    fn identical_documents_are_duplicates_once() {
        let v = vectors(&[
            ("cache eviction policy uses lru ordering", "a.md"),
            ("cache eviction policy uses lru ordering", "b.md"),
            ("network retries back off exponentially", "c.md"),
        ]);
        let pairs = SimilarityEngine::new(thresholds()).compare_all(&v).unwrap();
        assert_eq!(pairs.len(), 1);
        let p = pairs[0];
        assert_eq!((p.doc_a, p.doc_b), (DocId(0), DocId(1)));
        assert!((p.score - 1.0).abs() < 1e-9);
        assert_eq!(p.band, Band::Duplicate);
    }

    #[test]
    fn same_source_pairs_are_skipped_by_default() {
        let inputs = [
            ("cache eviction policy uses lru ordering", "a.md"),
            ("cache eviction policy uses lru ordering", "a.md"),
            ("network retries back off exponentially", "c.md"),
        ];
        let v = vectors(&inputs);
        assert!(SimilarityEngine::new(thresholds()).compare_all(&v).unwrap().is_empty());

        let v = vectors(&inputs);
        let pairs = SimilarityEngine::new(thresholds())
            .exclude_same_source(false)
            .compare_all(&v)
            .unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn batching_does_not_change_results() {
        let inputs: Vec<(String, String)> = (0..12)
            .map(|i| (format!("shared words topic{} extra{}", i % 3, i % 4), format!("f{i}.md")))
            .collect();
        let docs = Document::from_inputs(inputs, &BasicTokenizer::new());
        let stats = Arc::new(CorpusStatistics::build(&docs, IdfMode::Standard).unwrap());
        let v = Vectorizer::<f64>::new(stats).vectorize_all(&docs);

        let one = SimilarityEngine::new(thresholds()).batch_rows(1).compare_all(&v).unwrap();
        let big = SimilarityEngine::new(thresholds()).batch_rows(100).compare_all(&v).unwrap();
        assert_eq!(one, big);
        assert!(one.windows(2).all(|w| (w[0].doc_a, w[0].doc_b) < (w[1].doc_a, w[1].doc_b)));
    }

    #[test]
    fn repeated_doc_id_is_not_paired_with_itself() {
        let v = vectors(&[
            ("cache eviction policy uses lru ordering", "a.md"),
            ("cache eviction policy uses lru ordering", "b.md"),
            ("network retries back off exponentially", "c.md"),
        ]);
        let mut twin = v[1].clone();
        twin.doc = v[0].doc;
        let pairs = SimilarityEngine::new(thresholds())
            .exclude_same_source(false)
            .compare_all(&[v[0].clone(), twin, v[2].clone()])
            .unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn cancelled_token_stops_the_sweep() {
        let v = vectors(&[("alpha beta", "a.md"), ("alpha gamma", "b.md")]);
        let token = CancelToken::new();
        token.cancel();
        let err = SimilarityEngine::new(thresholds())
            .compare_all_with_cancel(&v, &token)
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled { completed_rows: 0 }));
    }

    #[test]
    fn mixed_snapshots_are_rejected() {
        let mut v = vectors(&[("alpha beta", "a.md"), ("alpha gamma", "b.md")]);
        let other = vectors(&[("alpha beta", "a.md"), ("delta", "b.md")]);
        v.push(other[0].clone());
        let err = SimilarityEngine::new(thresholds()).compare_all(&v).unwrap_err();
        assert!(matches!(err, Error::SnapshotMismatch { .. }));
    }

    #[test]
    fn empty_and_single_inputs_yield_nothing() {
        let engine = SimilarityEngine::new(thresholds());
        assert!(engine.compare_all::<f64>(&[]).unwrap().is_empty());
        let v = vectors(&[("alpha", "a.md")]);
        assert!(engine.compare_all(&v).unwrap().is_empty());
    }
}
