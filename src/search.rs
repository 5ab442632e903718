//! Nearest-neighbor retrieval over a built index.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::parsing::Language;
use crate::semantic::EmbeddingProvider;
use crate::storage::{ScoredEntry, StorageError, VectorStore};
use crate::types::FunctionMetadata;

/// One ranked search result. `distance` is cosine distance: smaller is
/// nearer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub id: String,
    pub document: String,
    pub metadata: FunctionMetadata,
    pub distance: f32,
}

impl From<ScoredEntry> for Hit {
    fn from(entry: ScoredEntry) -> Self {
        Self {
            id: entry.id,
            document: entry.document,
            metadata: entry.metadata,
            distance: entry.distance,
        }
    }
}

/// Embeds free-text queries and searches the per-language collections.
///
/// Must be constructed with the same embedding provider used at build
/// time, since the stored vectors only make sense in that space.
pub struct QueryEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    store: VectorStore,
}

impl QueryEngine {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: VectorStore) -> Self {
        Self { embedder, store }
    }

    /// Search `language` (any accepted alias) for the `top_k` functions
    /// nearest to `query`, nearest first.
    ///
    /// A language that was never indexed is an error; an indexed but
    /// empty collection yields zero hits.
    pub fn search(&self, query: &str, language: &str, top_k: usize) -> IndexResult<Vec<Hit>> {
        let language =
            Language::from_alias(language).ok_or_else(|| IndexError::UnsupportedLanguage {
                given: language.to_string(),
                supported: Language::supported_tags(),
            })?;

        let collection = self
            .store
            .collection(&language.collection_name())
            .map_err(|e| match e {
                StorageError::CollectionNotFound(_) => IndexError::CollectionNotFound {
                    language: language.tag().to_string(),
                },
                other => other.into(),
            })?;

        if collection.is_empty() {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query)?;
        let hits = collection.query(&vector, top_k);
        debug!("query '{query}' -> {} hits in {}", hits.len(), collection.name());
        Ok(hits.into_iter().map(Hit::from).collect())
    }
}
