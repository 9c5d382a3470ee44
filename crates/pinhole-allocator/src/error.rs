use pinhole_core::{KeyError, ShortenerError, StoreError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AllocationError {
    #[error("invalid short key: {0}")]
    InvalidKeyFormat(#[from] KeyError),
    #[error("short key already exists: {0}")]
    KeyTaken(String),
    #[error("no free short key after {attempts} attempts")]
    Exhausted { attempts: usize },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<AllocationError> for ShortenerError {
    fn from(value: AllocationError) -> Self {
        match value {
            AllocationError::InvalidKeyFormat(e) => Self::InvalidKeyFormat(e.to_string()),
            AllocationError::KeyTaken(key) => Self::KeyTaken(key),
            AllocationError::Exhausted { attempts } => Self::AllocationExhausted { attempts },
            AllocationError::Store(e) => e.into(),
        }
    }
}
