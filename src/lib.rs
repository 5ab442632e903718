pub mod config;
pub mod docgen;
pub mod error;
pub mod identity;
pub mod indexing;
pub mod logging;
pub mod parsing;
pub mod search;
pub mod semantic;
pub mod storage;
pub mod types;

pub use config::Settings;
pub use error::{IndexError, IndexResult};
pub use identity::assign_id;
pub use indexing::{BuildReport, CancelToken, FileWalker, IndexBuilder};
pub use parsing::{ExtractorFactory, Language, LanguageExtractor};
pub use search::{Hit, QueryEngine};
pub use semantic::{EmbeddingProvider, FastEmbedder, HashEmbedder};
pub use storage::{Collection, IndexEntry, VectorStore};
pub use types::{FunctionMetadata, FunctionRecord};
