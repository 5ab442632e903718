//! Error taxonomy for extraction, indexing, and retrieval.
//!
//! Errors local to one unit of work (one function node, one file, one batch
//! item) are recovered by the caller and aggregated into a [`BuildReport`];
//! precondition errors abort only the operation that lacked the precondition.
//!
//! [`BuildReport`]: crate::indexing::BuildReport

use std::path::PathBuf;
use thiserror::Error;

use crate::docgen::GenerationError;
use crate::semantic::EmbeddingError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("cannot detect language for {path}: {reason}")]
    Detection { path: PathBuf, reason: String },

    #[error("extraction failed for {path}: {cause}")]
    Extraction { path: PathBuf, cause: String },

    #[error("failed to initialize {language} grammar: {cause}")]
    ParserInit { language: String, cause: String },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("upsert failed for {id}: {cause}")]
    Upsert { id: String, cause: String },

    #[error("no index found for language '{language}'. Run `funcdex index` first")]
    CollectionNotFound { language: String },

    #[error("duplicate function id: {id}")]
    DuplicateIdentity { id: String },

    #[error("unsupported language '{given}'. Supported: {supported}")]
    UnsupportedLanguage { given: String, supported: String },

    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("no {language} files found under {root}")]
    NoFilesFound { language: String, root: PathBuf },

    #[error("worker pool error: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type IndexResult<T> = Result<T, IndexError>;
