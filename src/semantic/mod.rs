//! Embedding providers.
//!
//! Build and query must share one embedding function; the vectors only
//! live in one space. The production provider wraps fastembed; the hashed
//! provider is deterministic and offline, for tests and air-gapped runs.

use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("failed to initialize embedding model: {0}")]
    ModelInit(String),

    #[error("failed to generate embedding: {0}")]
    Embedding(String),

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// The opaque text-to-vector service consumed by indexing and search.
pub trait EmbeddingProvider: Send + Sync {
    /// Fixed output dimensionality of this provider.
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(std::slice::from_ref(&text.to_string()))?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Embedding("provider returned no vector".to_string()))
    }
}

/// fastembed-backed provider. The model is wrapped in a `Mutex` because
/// fastembed needs `&mut self` to embed.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
    dimensions: usize,
}

impl FastEmbedder {
    /// Create with the default model (AllMiniLML6V2, 384 dimensions).
    pub fn new() -> Result<Self, EmbeddingError> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2)
    }

    pub fn with_model(model: EmbeddingModel) -> Result<Self, EmbeddingError> {
        let mut text_model =
            TextEmbedding::try_new(InitOptions::new(model).with_show_download_progress(true))
                .map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;

        // Learn the dimensionality from a probe embedding.
        let probe = text_model
            .embed(vec!["probe"], None)
            .map_err(|e| EmbeddingError::Embedding(e.to_string()))?;
        let dimensions = probe
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::ModelInit("model returned no probe vector".to_string()))?
            .len();

        Ok(Self {
            model: Mutex::new(text_model),
            dimensions,
        })
    }

    /// Create from the configured model name, falling back to the default
    /// on an unrecognized name.
    pub fn from_name(name: &str) -> Result<Self, EmbeddingError> {
        let model = match name {
            "AllMiniLML6V2" => EmbeddingModel::AllMiniLML6V2,
            "AllMiniLML6V2Q" => EmbeddingModel::AllMiniLML6V2Q,
            "BGESmallENV15" => EmbeddingModel::BGESmallENV15,
            other => {
                warn!("unknown embedding model '{other}', using AllMiniLML6V2");
                EmbeddingModel::AllMiniLML6V2
            }
        };
        Self::with_model(model)
    }
}

impl EmbeddingProvider for FastEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self
            .model
            .lock()
            .map_err(|_| EmbeddingError::Embedding("model lock poisoned".to_string()))?
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::Embedding(e.to_string()))?;

        for vector in &vectors {
            if vector.len() != self.dimensions {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimensions,
                    got: vector.len(),
                });
            }
        }
        Ok(vectors)
    }
}

/// Deterministic offline provider: vectors are derived purely from the
/// input bytes, so equal texts embed equally across runs and machines.
/// Not semantically meaningful; useful for tests and environments where
/// the model cannot be downloaded.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self { dimensions: 384 }
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|text| {
                // FNV-1a over the bytes seeds a small LCG per dimension.
                let mut state: u64 = 0xcbf2_9ce4_8422_2325;
                for byte in text.as_bytes() {
                    state ^= u64::from(*byte);
                    state = state.wrapping_mul(0x100_0000_01b3);
                }
                let mut vector = Vec::with_capacity(self.dimensions);
                for _ in 0..self.dimensions {
                    state = state
                        .wrapping_mul(6_364_136_223_846_793_005)
                        .wrapping_add(1_442_695_040_888_963_407);
                    let unit = (state >> 33) as f32 / (1u64 << 31) as f32;
                    vector.push(unit * 2.0 - 1.0);
                }
                let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for v in &mut vector {
                        *v /= norm;
                    }
                }
                vector
            })
            .collect())
    }
}
