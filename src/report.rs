//! Analysis output.

use serde::{Deserialize, Serialize};

use crate::{
    contradiction::ContradictionRecord,
    similarity::SimilarityPair,
    terminology::TerminologyGroup,
    tokenizer::TokenizerBackend,
    vectorizer::SourceId,
};

/// A near-duplicate pair with enough context to review it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateFinding {
    pub pair: SimilarityPair,
    pub source_a: SourceId,
    pub source_b: SourceId,
    pub excerpt_a: String,
    pub excerpt_b: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub document_count: usize,
    /// Distinct sources
    pub file_count: usize,
    pub vocabulary_size: usize,
    pub tokenizer: TokenizerBackend,
}

/// Everything one analysis run found
///
/// Persisting or rendering it is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub duplicates: Vec<DuplicateFinding>,
    /// Whole-document records first, then sentence-level ones
    pub contradictions: Vec<ContradictionRecord>,
    pub terminology_issues: Vec<TerminologyGroup>,
    pub statistics: ReportStatistics,
}

impl Report {
    pub fn issue_count(&self) -> usize {
        self.duplicates.len() + self.contradictions.len() + self.terminology_issues.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}
