use thiserror::Error;

/// Result type for mapping store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised while parsing a [`ShortKey`](crate::key::ShortKey).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("short key cannot be empty")]
    Empty,
    #[error("short key must contain only lowercase letters and digits: '{0}'")]
    InvalidCharacter(String),
}

/// Errors raised while decoding a stored mapping record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("record key is invalid: {0}")]
    InvalidKey(#[from] KeyError),
    #[error("record url is invalid: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("store operation timed out: {0}")]
    Timeout(String),
    #[error("stored record for '{key}' is corrupt: {reason}")]
    CorruptRecord { key: String, reason: String },
    #[error("store operation failed: {0}")]
    Operation(String),
}

/// Errors surfaced at the shortener boundary.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid short key: {0}")]
    InvalidKeyFormat(String),
    #[error("short key already exists: {0}")]
    KeyTaken(String),
    #[error("mapping not found: {0}")]
    NotFound(String),
    #[error("stored record for '{key}' is corrupt: {reason}")]
    CorruptRecord { key: String, reason: String },
    #[error("no free short key after {attempts} attempts")]
    AllocationExhausted { attempts: usize },
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for ShortenerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::CorruptRecord { key, reason } => Self::CorruptRecord { key, reason },
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}
