use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The catalog index or its metadata could not be loaded. Fatal at startup.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Query is empty")]
    EmptyQuery,

    /// The text-understanding service failed or returned an unusable payload.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
