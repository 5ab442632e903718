use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("invalid collection name: {0}")]
    InvalidName(String),

    #[error("upsert length mismatch: {0}")]
    LengthMismatch(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
