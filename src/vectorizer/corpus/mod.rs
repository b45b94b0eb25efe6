use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    vectorizer::{tfidf::IdfMode, Document},
};

/// Phase-1 accumulator
///
/// Collects document frequencies one document at a time. It cannot produce
/// vectors; call [`CorpusBuilder::finish`] to freeze it into
/// [`CorpusStatistics`] first.
#[derive(Debug, Default, Clone)]
pub struct CorpusBuilder {
    doc_num: u64,
    doc_freq: IndexMap<Box<str>, u64>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one document's tokens
    /// 重複 token は 1 回として数える
    pub fn add_set<T>(&mut self, tokens: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num += 1;
        let distinct: IndexSet<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        for token in distinct {
            *self.doc_freq.entry(token.into()).or_insert(0) += 1;
        }
    }

    pub fn add_document(&mut self, doc: &Document) {
        self.add_set(&doc.tokens);
    }

    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Freeze the statistics
    ///
    /// Fails with [`Error::EmptyCorpus`] when no document was added.
    pub fn finish(self, idf_mode: IdfMode) -> Result<CorpusStatistics> {
        if self.doc_num == 0 {
            return Err(Error::EmptyCorpus);
        }
        let stats = CorpusStatistics::from(StatisticsData {
            document_frequency: self.doc_freq,
            total_documents: self.doc_num,
            idf_mode,
        });
        tracing::debug!(
            documents = stats.total_documents,
            vocabulary = stats.vocab_size(),
            snapshot = stats.snapshot,
            "corpus statistics finished"
        );
        Ok(stats)
    }
}

/// Serialized form of [`CorpusStatistics`]; the snapshot is never stored
#[derive(Deserialize)]
struct StatisticsData {
    #[serde(with = "indexmap::map::serde_seq")]
    document_frequency: IndexMap<Box<str>, u64>,
    total_documents: u64,
    idf_mode: IdfMode,
}

impl From<StatisticsData> for CorpusStatistics {
    fn from(data: StatisticsData) -> Self {
        let snapshot = fingerprint(&data);
        Self {
            document_frequency: data.document_frequency,
            total_documents: data.total_documents,
            idf_mode: data.idf_mode,
            snapshot,
        }
    }
}

/// blake3 over document count, idf mode and the ordered (token, df) entries
fn fingerprint(data: &StatisticsData) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&data.total_documents.to_le_bytes());
    hasher.update(data.idf_mode.name().as_bytes());
    for (token, df) in &data.document_frequency {
        hasher.update(&(token.len() as u64).to_le_bytes());
        hasher.update(token.as_bytes());
        hasher.update(&df.to_le_bytes());
    }
    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

/// Immutable corpus-wide statistics
///
/// Holds the vocabulary (in first-seen order), the number of documents each
/// token occurs in, and the total document count. It does not keep any
/// document text.
///
/// Every [`crate::TermVector`] remembers the `snapshot` it was built against;
/// vectors from two different snapshots cannot be compared. The snapshot is
/// a fingerprint of the contents, so it is recomputed on deserialization and
/// equal statistics always share it, in any process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StatisticsData")]
pub struct CorpusStatistics {
    #[serde(with = "indexmap::map::serde_seq")]
    document_frequency: IndexMap<Box<str>, u64>,
    total_documents: u64,
    idf_mode: IdfMode,
    #[serde(skip)]
    snapshot: u64,
}

impl CorpusStatistics {
    /// Build statistics from a full corpus snapshot
    pub fn build(documents: &[Document], idf_mode: IdfMode) -> Result<Self> {
        let mut builder = CorpusBuilder::new();
        for doc in documents {
            builder.add_document(doc);
        }
        builder.finish(idf_mode)
    }

    /// Get the number of documents in the corpus
    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.total_documents
    }

    /// Get the current vocabulary size (number of unique tokens)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.document_frequency.len()
    }

    #[inline]
    pub fn idf_mode(&self) -> IdfMode {
        self.idf_mode
    }

    #[inline]
    pub fn snapshot(&self) -> u64 {
        self.snapshot
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.document_frequency.keys().map(|k| &**k)
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.document_frequency.contains_key(token)
    }

    /// Number of documents containing `token` (0 if unknown)
    #[inline]
    pub fn doc_freq(&self, token: &str) -> u64 {
        self.document_frequency.get(token).copied().unwrap_or(0)
    }

    /// Document frequencies in vocabulary order
    pub fn doc_freqs(&self) -> impl Iterator<Item = u64> + '_ {
        self.document_frequency.values().copied()
    }

    /// Vocabulary dimension of `token`
    #[inline]
    pub fn token_index(&self, token: &str) -> Option<usize> {
        self.document_frequency.get_index_of(token)
    }

    /// IDF of `token` under this corpus' mode
    /// Unknown tokens are treated as df = 0
    #[inline]
    pub fn idf(&self, token: &str) -> f64 {
        self.idf_mode.idf(self.total_documents, self.doc_freq(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_tokens_count_once_per_document() {
        let mut builder = CorpusBuilder::new();
        builder.add_set(&["rust", "rust", "fast"]);
        builder.add_set(&["rust", "safe"]);
        let stats = builder.finish(IdfMode::Standard).unwrap();

        assert_eq!(stats.doc_num(), 2);
        assert_eq!(stats.vocab_size(), 3);
        assert_eq!(stats.doc_freq("rust"), 2);
        assert_eq!(stats.doc_freq("fast"), 1);
        assert_eq!(stats.doc_freq("missing"), 0);
        assert_eq!(stats.vocabulary().collect::<Vec<_>>(), vec!["rust", "fast", "safe"]);
        assert_eq!(stats.token_index("safe"), Some(2));
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let err = CorpusBuilder::new().finish(IdfMode::Standard).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));
        assert!(matches!(
            CorpusStatistics::build(&[], IdfMode::Smoothed),
            Err(Error::EmptyCorpus)
        ));
    }

    #[test]
    fn snapshot_follows_contents() {
        let build = |tokens: &[&str], mode| {
            let mut b = CorpusBuilder::new();
            b.add_set(tokens);
            b.add_set(&["shared"]);
            b.finish(mode).unwrap()
        };
        let a = build(&["x"], IdfMode::Standard);
        assert_eq!(a.snapshot(), build(&["x"], IdfMode::Standard).snapshot());
        assert_ne!(a.snapshot(), build(&["y"], IdfMode::Standard).snapshot());
        assert_ne!(a.snapshot(), build(&["x"], IdfMode::Smoothed).snapshot());
    }

    #[test]
    fn idf_is_monotone_in_doc_freq() {
        let mut builder = CorpusBuilder::new();
        builder.add_set(&["common", "rare"]);
        builder.add_set(&["common"]);
        builder.add_set(&["common", "mid"]);
        builder.add_set(&["mid"]);
        for mode in [IdfMode::Standard, IdfMode::Smoothed] {
            let stats = builder.clone().finish(mode).unwrap();
            assert!(stats.idf("rare") >= stats.idf("mid"));
            assert!(stats.idf("mid") >= stats.idf("common"));
        }
        let stats = builder.finish(IdfMode::Smoothed).unwrap();
        // unseen token gets the largest smoothed idf
        assert!(stats.idf("unseen") >= stats.idf("rare"));
    }
}
