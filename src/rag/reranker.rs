//! Cross-encoder reranking of retrieved candidates.
//!
//! Hybrid retrieval over-fetches candidates; the reranker re-scores each
//! one against the query with a cross-encoder model and keeps the best.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{RerankInitOptions, RerankerModel, TextRerank};
use tokio::sync::OnceCell;

use crate::types::{AppError, Result, SourceNode};

/// Re-scores a candidate set against a query, returning the top-n.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank `candidates` for `query` and keep the `top_n` best. The
    /// returned nodes carry the reranker's score instead of the retrieval
    /// score.
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SourceNode>,
        top_n: usize,
    ) -> Result<Vec<SourceNode>>;
}

/// Reranker backed by a fastembed cross-encoder model.
///
/// The model is loaded lazily on first use; weights are cached in the same
/// local directory as the embedding model.
pub struct CrossEncoderReranker {
    model_dir: PathBuf,
    model: OnceCell<Arc<tokio::sync::Mutex<TextRerank>>>,
}

impl CrossEncoderReranker {
    /// Create a reranker whose model weights live under `model_dir`.
    pub fn new(model_dir: &Path) -> Self {
        Self {
            model_dir: model_dir.to_path_buf(),
            model: OnceCell::new(),
        }
    }

    /// Get or initialize the reranking model.
    async fn get_model(&self) -> Result<Arc<tokio::sync::Mutex<TextRerank>>> {
        self.model
            .get_or_try_init(|| async {
                let model_dir = self.model_dir.clone();
                tokio::task::spawn_blocking(move || {
                    let init_options = RerankInitOptions::new(RerankerModel::BGERerankerBase)
                        .with_cache_dir(model_dir)
                        .with_show_download_progress(true);
                    let model = TextRerank::try_new(init_options).map_err(|e| {
                        AppError::Embedding(format!("Failed to load reranker: {}", e))
                    })?;
                    Ok(Arc::new(tokio::sync::Mutex::new(model)))
                })
                .await
                .map_err(|e| AppError::Embedding(format!("Reranker task failed: {}", e)))?
            })
            .await
            .map(Arc::clone)
    }
}

#[async_trait]
impl Reranker for CrossEncoderReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SourceNode>,
        top_n: usize,
    ) -> Result<Vec<SourceNode>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.get_model().await?;
        let documents: Vec<String> = candidates.iter().map(|c| c.content.clone()).collect();

        let query = query.to_string();
        let rerank_scores = tokio::task::spawn_blocking(move || {
            let mut model = model.blocking_lock();
            model.rerank(query, &documents, true, None)
        })
        .await
        .map_err(|e| AppError::Embedding(format!("Rerank task failed: {}", e)))?
        .map_err(|e| AppError::Embedding(format!("Reranking failed: {}", e)))?;

        let mut reranked: Vec<SourceNode> = candidates
            .into_iter()
            .enumerate()
            .map(|(idx, mut node)| {
                node.score = rerank_scores
                    .iter()
                    .find(|r| r.index == idx)
                    .map(|r| r.score)
                    .unwrap_or(0.0);
                node
            })
            .collect();

        reranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        reranked.truncate(top_n);

        Ok(reranked)
    }
}
