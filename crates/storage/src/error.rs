#![forbid(unsafe_code)]

use tbr_core::ids::TagId;
use tbr_core::{ConfigError, ResolveError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("unknown tag id {0}")]
    UnknownTag(TagId),
    #[error("tag {normalized_name:?} missing right after insert")]
    MissingAfterInsert { normalized_name: String },
    #[error("tag candidate #{index} is blank")]
    BlankCandidate { index: usize },
}

impl From<ResolveError<StoreError>> for StoreError {
    fn from(value: ResolveError<StoreError>) -> Self {
        match value {
            ResolveError::BlankCandidate { index } => Self::BlankCandidate { index },
            ResolveError::Repository(err) => err,
        }
    }
}
