//! Dense embedding provider.
//!
//! [`Embedder`] is the seam used by the engine, the ingestion pipeline, and
//! the evaluation harness; [`FastembedEmbedder`] is the production
//! implementation backed by a local ONNX model loaded through fastembed.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::types::{AppError, Result};

/// Maps text to fixed-dimension vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimensionality of the produced vectors.
    fn dimensions(&self) -> usize;
}

/// Cosine similarity between two vectors. Returns 0.0 for mismatched
/// lengths or zero-norm inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Embedding provider backed by a fastembed ONNX model with weights cached
/// in a local directory.
pub struct FastembedEmbedder {
    model: Arc<tokio::sync::Mutex<TextEmbedding>>,
    dimensions: usize,
}

impl std::fmt::Debug for FastembedEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastembedEmbedder")
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl FastembedEmbedder {
    /// Vector dimensionality of the default model (BGE-small).
    const DIMENSIONS: usize = 384;

    /// Load the embedding model from `model_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] naming the directory if it does
    /// not exist, or [`AppError::Embedding`] if model initialization fails.
    pub fn new(model_dir: &Path) -> Result<Self> {
        if !model_dir.is_dir() {
            return Err(AppError::Configuration(format!(
                "embedding model directory '{}' not found - download the model weights \
                 or set EMBED_MODEL_DIR",
                model_dir.display()
            )));
        }

        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::BGESmallENV15)
                .with_cache_dir(model_dir.to_path_buf())
                .with_show_download_progress(true),
        )
        .map_err(|e| AppError::Embedding(format!("Failed to load embedding model: {}", e)))?;

        Ok(Self {
            model: Arc::new(tokio::sync::Mutex::new(model)),
            dimensions: Self::DIMENSIONS,
        })
    }
}

#[async_trait]
impl Embedder for FastembedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_batch(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| AppError::Embedding("Embedding model returned no vector".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();

        // Inference is CPU-bound; keep it off the async executor.
        tokio::task::spawn_blocking(move || {
            let mut model = model.blocking_lock();
            model
                .embed(texts, None)
                .map_err(|e| AppError::Embedding(format!("Embedding failed: {}", e)))
        })
        .await
        .map_err(|e| AppError::Embedding(format!("Embedding task failed: {}", e)))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
