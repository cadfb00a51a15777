use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoxSortError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] DecodeError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("No box with id {0}")]
    NotFound(String),

    #[error("Index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid image handle: {0:?}")]
    InvalidHandle(String),

    #[error("Format error: {0}")]
    Format(String),
}

/// Why a persisted collection could not be read back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no data")]
    Empty,

    #[error("truncated input")]
    Truncated,

    #[error("bad magic")]
    BadMagic,

    #[error("payload checksum mismatch")]
    Checksum,

    #[error("unsupported schema version {0}")]
    UnsupportedVersion(u16),

    #[error("schema mismatch: {0}")]
    Schema(String),
}

/// A draft or edited box that may not be admitted to the repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("box name is empty")]
    EmptyBoxName,

    #[error("item #{index} has an empty name")]
    EmptyItemName { index: usize },

    #[error("box id cannot be reassigned")]
    IdChanged,
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, BoxSortError>;
