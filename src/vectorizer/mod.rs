pub mod compute;
pub mod corpus;
pub mod serde;
pub mod tfidf;
pub mod token;

use std::fmt;
use std::sync::Arc;

use num::Num;
use ::serde::{Deserialize, Serialize};

use crate::{
    tokenizer::Tokenizer,
    utils::math::vector::SparseVec,
    vectorizer::{
        corpus::CorpusStatistics,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
        token::TokenFrequency,
    },
};

/// Dense document index, assigned in ingestion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(pub usize);

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a document came from (usually a file path)
pub type SourceId = Arc<str>;

/// A unit of text under analysis
///
/// Built once at ingestion; the tokens are computed by the tokenizer at that
/// point and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub source_id: SourceId,
    pub raw_text: String,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn new(id: DocId, source_id: SourceId, raw_text: impl Into<String>, tokenizer: &dyn Tokenizer) -> Self {
        let raw_text = raw_text.into();
        let tokens = tokenizer.tokenize(&raw_text);
        Self {
            id,
            source_id,
            raw_text,
            tokens,
        }
    }

    /// Turn ordered `(text, source)` inputs into documents
    /// Sources with equal names share one allocation
    pub fn from_inputs<I, T, S>(inputs: I, tokenizer: &dyn Tokenizer) -> Vec<Document>
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: AsRef<str>,
    {
        let mut sources: indexmap::IndexSet<SourceId> = indexmap::IndexSet::new();
        inputs
            .into_iter()
            .enumerate()
            .map(|(i, (text, source))| {
                let source_id = match sources.get(source.as_ref()) {
                    Some(existing) => Arc::clone(existing),
                    None => {
                        let fresh: SourceId = Arc::from(source.as_ref());
                        sources.insert(Arc::clone(&fresh));
                        fresh
                    }
                };
                Document::new(DocId(i), source_id, text, tokenizer)
            })
            .collect()
    }

    pub fn token_frequency(&self) -> TokenFrequency {
        self.tokens.iter().collect()
    }

    /// Look `id` up in `docs`; ids are dense, so the index is tried first
    pub fn find(docs: &[Document], id: DocId) -> Option<&Document> {
        match docs.get(id.0) {
            Some(d) if d.id == id => Some(d),
            _ => docs.iter().find(|d| d.id == id),
        }
    }
}

/// Sparse TF-IDF vector of one document
///
/// Indices are vocabulary dimensions of the [`CorpusStatistics`] identified
/// by `snapshot`. Weights are never negative and zero weights are not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermVector<N = f64>
where
    N: Num + Copy,
{
    pub doc: DocId,
    pub source: SourceId,
    pub weights: SparseVec<N>,
    pub snapshot: u64,
}

impl<N> TermVector<N>
where
    N: Num + Copy,
{
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// TF-IDF Vectorizer
///
/// Bound to one finished [`CorpusStatistics`]. The IDF of every vocabulary
/// entry is computed once at construction; vectorizing a document afterwards
/// only reads it.
///
/// `Vectorizer<N, E>` has the following generic parameters:
/// - `N`: weight type (f32 or f64 with the default engine)
/// - `E`: TF-IDF calculation engine
#[derive(Debug, Clone)]
pub struct Vectorizer<N = f64, E = DefaultTFIDFEngine>
where
    N: Num + Copy,
    E: TFIDFEngine<N>,
{
    /// Corpus reference
    pub corpus_ref: Arc<CorpusStatistics>,
    /// IDF cache, vocabulary order
    pub idf_cache: Vec<N>,
    _marker: std::marker::PhantomData<E>,
}

impl<N, E> Vectorizer<N, E>
where
    N: Num + Copy,
    E: TFIDFEngine<N>,
{
    pub fn new(corpus_ref: Arc<CorpusStatistics>) -> Self {
        let idf_cache = E::idf_vec(&corpus_ref);
        Self {
            corpus_ref,
            idf_cache,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn corpus(&self) -> &CorpusStatistics {
        &self.corpus_ref
    }

    /// TF-IDF vector of `doc`
    ///
    /// TF is normalised by the document's own most frequent token. Tokens
    /// outside the vocabulary are dropped; an empty document gives an empty
    /// vector.
    pub fn vectorize(&self, doc: &Document) -> TermVector<N> {
        let freq = doc.token_frequency();
        let tf_vec = E::tf_vec(&freq, &self.corpus_ref);
        let mut weights = SparseVec::from_unsorted(tf_vec.raw_iter().filter_map(|(idx, tf)| {
            // idf_cache は語彙と同じ長さ
            let idf = *self.idf_cache.get(idx)?;
            Some((idx as u32, E::weight(tf, idf)))
        }));
        weights.shrink_to_fit();
        TermVector {
            doc: doc.id,
            source: Arc::clone(&doc.source_id),
            weights,
            snapshot: self.corpus_ref.snapshot(),
        }
    }

    /// Vectorize every document, in parallel, keeping input order
    pub fn vectorize_all(&self, docs: &[Document]) -> Vec<TermVector<N>>
    where
        N: Send + Sync,
        E: Sync,
    {
        use rayon::prelude::*;
        docs.par_iter().map(|doc| self.vectorize(doc)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::BasicTokenizer;
    use crate::vectorizer::tfidf::IdfMode;

    fn docs(texts: &[(&str, &str)]) -> Vec<Document> {
        Document::from_inputs(texts.iter().copied(), &BasicTokenizer::new())
    }

    #[test]
    fn from_inputs_assigns_ids_and_shares_sources() {
        let docs = docs(&[("alpha beta", "a.md"), ("gamma", "a.md"), ("delta", "b.md")]);
        assert_eq!(docs[2].id, DocId(2));
        assert!(Arc::ptr_eq(&docs[0].source_id, &docs[1].source_id));
        assert_eq!(&*docs[2].source_id, "b.md");
        assert_eq!(Document::find(&docs, DocId(1)).unwrap().raw_text, "gamma");
        assert!(Document::find(&docs, DocId(7)).is_none());
    }

    #[test]
    fn tf_is_normalised_by_max_frequency() {
        let docs = docs(&[("alpha alpha beta", "a.md"), ("gamma", "b.md")]);
        let stats = Arc::new(CorpusStatistics::build(&docs, IdfMode::Standard).unwrap());
        let vectorizer: Vectorizer<f64> = Vectorizer::new(Arc::clone(&stats));
        let v = vectorizer.vectorize(&docs[0]);

        let ln2 = 2f64.ln();
        let alpha = stats.token_index("alpha").unwrap() as u32;
        let beta = stats.token_index("beta").unwrap() as u32;
        assert!((v.weights.get(alpha).unwrap() - ln2).abs() < 1e-12);
        assert!((v.weights.get(beta).unwrap() - 0.5 * ln2).abs() < 1e-12);
        assert_eq!(v.snapshot, stats.snapshot());
    }

    #[test]
    fn empty_document_gives_empty_vector() {
        let docs = docs(&[("...", "a.md"), ("words here", "b.md")]);
        let stats = Arc::new(CorpusStatistics::build(&docs, IdfMode::Standard).unwrap());
        let vectorizer: Vectorizer<f32> = Vectorizer::new(stats);
        assert!(vectorizer.vectorize(&docs[0]).is_empty());
    }

    #[test]
    fn tokens_outside_vocabulary_are_dropped() {
        let tok = BasicTokenizer::new();
        let corpus = docs(&[("alpha", "a.md"), ("beta", "b.md")]);
        let stats = Arc::new(CorpusStatistics::build(&corpus, IdfMode::Standard).unwrap());
        let vectorizer: Vectorizer<f64> = Vectorizer::new(stats);
        let stranger = Document::new(DocId(9), Arc::from("c.md"), "omega alpha", &tok);
        assert_eq!(vectorizer.vectorize(&stranger).weights.nnz(), 1);
    }
}
