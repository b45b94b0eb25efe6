//! Error types for doc-consistency.

use thiserror::Error;

/// Result type for doc-consistency operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for doc-consistency operations.
///
/// Heuristic misses (an antonym that was not caught, a number that was) are
/// quality issues and never show up here.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Corpus statistics were requested for zero documents.
    #[error("corpus is empty: statistics need at least one document")]
    EmptyCorpus,

    /// A configuration value is out of range.
    #[error("invalid configuration `{field}`: {message}")]
    InvalidConfig { field: String, message: String },

    /// Configuration text could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// An antonym pattern or glossary term failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Vectors built against different corpus snapshots were compared.
    #[error("vectors from corpus snapshot {found} cannot be compared with snapshot {expected}")]
    SnapshotMismatch { expected: u64, found: u64 },

    /// A sweep stopped at a cancellation point.
    #[error("sweep cancelled after {completed_rows} rows")]
    Cancelled { completed_rows: usize },

    /// Statistics snapshot encoding or decoding failed.
    #[error("snapshot codec error: {0}")]
    Snapshot(#[from] serde_cbor::Error),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}
