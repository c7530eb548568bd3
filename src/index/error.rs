use std::path::PathBuf;

use thiserror::Error;

use crate::types::identifiers::{ArtifactDigest, EntryId};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Index encoding error: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("Metadata serialization error: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("Not an index artifact: {0}")]
    BadMagic(PathBuf),
    #[error("Unsupported index format version: {0}")]
    UnsupportedFormat(u32),
    #[error("Index and metadata artifacts do not match: index expects {expected}, metadata hashes to {actual}")]
    DigestMismatch {
        expected: ArtifactDigest,
        actual: ArtifactDigest,
    },
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Index artifact pair is incomplete, missing {0}")]
    IncompletePair(PathBuf),
    #[error("Corrupt index artifact: {0}")]
    Corrupt(String),
    #[error("Entry id space exhausted after {0}")]
    IdsExhausted(EntryId),
}
