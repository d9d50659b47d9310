//! Error types for the card store, category index and scheduler.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A category, bucket or card that must exist is missing.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("category already exists: {0}")]
    AlreadyExists(String),

    /// The id counter does not match the id being assigned.
    #[error("id conflict: expected {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    /// A persisted record could not be parsed, or card text cannot be stored.
    #[error("malformed record: {0}")]
    Format(String),

    /// The same card id lives in more than one due-date bucket.
    #[error("card {id} is present in several buckets: {}", .buckets.join(", "))]
    Corruption { id: u64, buckets: Vec<String> },

    #[error("invalid category name: {0:?}")]
    InvalidName(String),

    #[error("due date out of range: {days} days after {from}")]
    DateOutOfRange { from: chrono::NaiveDate, days: u64 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
