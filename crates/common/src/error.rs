//! Error types for fixture loading

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`LoadError`]
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors raised while building a case set. All of them are fatal to a run.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed fixture {origin}: {reason}")]
    Malformed { origin: String, reason: String },

    #[error("Duplicate case id '{id}' at positions {first} and {second}")]
    DuplicateId {
        id: String,
        first: usize,
        second: usize,
    },

    #[error("Case at position {index} has an empty id")]
    EmptyId { index: usize },

    #[error("Unsupported fixture format: {0}")]
    UnsupportedFormat(String),

    #[error("No fixture files found under {0}")]
    NoFixtures(PathBuf),
}

impl LoadError {
    pub(crate) fn malformed(origin: impl Into<String>, reason: impl ToString) -> Self {
        LoadError::Malformed {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}
