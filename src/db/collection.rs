//! A named collection of embedded chunks with hybrid search.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::rag::embeddings::cosine_similarity;
use crate::rag::search::{min_max_normalize, Bm25Index};
use crate::types::{AppError, Document, Result};

/// Collection metadata stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionMetadata {
    name: String,
    dimensions: usize,
}

/// Snapshot of a collection used to brief the LLM in the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Total number of stored chunks.
    pub count: usize,
    /// A handful of example chunk IDs.
    pub sample_ids: Vec<String>,
    /// A handful of distinct source file names.
    pub sample_files: Vec<String>,
}

struct CollectionInner {
    documents: HashMap<String, Document>,
    lexical: Bm25Index,
}

/// A named container of embedded chunks, persisted as JSON under its own
/// directory. Chunks are id-keyed: re-upserting an id replaces the chunk.
pub struct Collection {
    name: String,
    dimensions: usize,
    dir: PathBuf,
    inner: RwLock<CollectionInner>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl Collection {
    /// Create an empty collection rooted at `dir`.
    pub(crate) fn create(name: &str, dimensions: usize, dir: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            dimensions,
            dir,
            inner: RwLock::new(CollectionInner {
                documents: HashMap::new(),
                lexical: Bm25Index::new(),
            }),
        }
    }

    /// Load a collection from its directory.
    pub(crate) async fn load(name: &str, dir: PathBuf) -> Result<Self> {
        let metadata_path = dir.join("metadata.json");
        let metadata_json = tokio::fs::read_to_string(&metadata_path)
            .await
            .map_err(|e| AppError::Store(format!("failed to read collection metadata: {}", e)))?;
        let metadata: CollectionMetadata = serde_json::from_str(&metadata_json)
            .map_err(|e| AppError::Store(format!("failed to parse collection metadata: {}", e)))?;

        let records_path = dir.join("records.json");
        let documents: Vec<Document> = if records_path.exists() {
            let records_json = tokio::fs::read_to_string(&records_path)
                .await
                .map_err(|e| AppError::Store(format!("failed to read collection records: {}", e)))?;
            serde_json::from_str(&records_json)
                .map_err(|e| AppError::Store(format!("failed to parse collection records: {}", e)))?
        } else {
            Vec::new()
        };

        let mut lexical = Bm25Index::new();
        let mut map = HashMap::with_capacity(documents.len());
        for doc in documents {
            lexical.add_document(&doc.id, &doc.content);
            map.insert(doc.id.clone(), doc);
        }

        info!(name, count = map.len(), "loaded collection");

        Ok(Self {
            name: metadata.name,
            dimensions: metadata.dimensions,
            dir,
            inner: RwLock::new(CollectionInner {
                documents: map,
                lexical,
            }),
        })
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vector dimensionality of stored embeddings.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of stored chunks.
    pub fn count(&self) -> usize {
        self.inner.read().documents.len()
    }

    /// Upsert embedded chunks. Chunks are keyed by id; an existing id is
    /// replaced in both the vector map and the lexical index.
    ///
    /// # Errors
    ///
    /// Fails if any chunk is missing its embedding or has the wrong
    /// dimensionality.
    pub fn upsert(&self, documents: Vec<Document>) -> Result<usize> {
        let mut inner = self.inner.write();

        let mut count = 0;
        for doc in documents {
            let embedding = doc.embedding.as_ref().ok_or_else(|| {
                AppError::InvalidInput(format!("chunk '{}' is missing its embedding", doc.id))
            })?;
            if embedding.len() != self.dimensions {
                return Err(AppError::InvalidInput(format!(
                    "chunk '{}' has {} dimensions, collection expects {}",
                    doc.id,
                    embedding.len(),
                    self.dimensions
                )));
            }

            if inner.documents.contains_key(&doc.id) {
                inner.lexical.remove_document(&doc.id);
            }
            inner.lexical.add_document(&doc.id, &doc.content);
            inner.documents.insert(doc.id.clone(), doc);
            count += 1;
        }

        Ok(count)
    }

    /// Sample the collection for the system-prompt briefing: total count,
    /// the first `limit` chunk IDs, and up to `limit` distinct file names.
    pub fn summary(&self, limit: usize) -> CollectionSummary {
        let inner = self.inner.read();

        let mut ids: Vec<String> = inner.documents.keys().cloned().collect();
        ids.sort();

        let mut files: Vec<String> = Vec::new();
        for id in &ids {
            if let Some(doc) = inner.documents.get(id) {
                if !files.contains(&doc.metadata.file_name) {
                    files.push(doc.metadata.file_name.clone());
                    if files.len() >= limit {
                        break;
                    }
                }
            }
        }

        CollectionSummary {
            count: inner.documents.len(),
            sample_ids: ids.into_iter().take(limit).collect(),
            sample_files: files,
        }
    }

    /// Hybrid similarity query: blends min-max-normalized cosine similarity
    /// against `query_embedding` with normalized BM25 score for
    /// `query_text`, as `alpha * semantic + (1 - alpha) * lexical`.
    ///
    /// Returns up to `top_k` `(chunk, score)` pairs, best first. Returned
    /// chunks have their embeddings stripped.
    pub fn query_hybrid(
        &self,
        query_text: &str,
        query_embedding: &[f32],
        top_k: usize,
        alpha: f32,
    ) -> Result<Vec<(Document, f32)>> {
        if query_embedding.len() != self.dimensions {
            return Err(AppError::InvalidInput(format!(
                "query has {} dimensions, collection expects {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let inner = self.inner.read();

        let semantic: Vec<(String, f32)> = inner
            .documents
            .values()
            .filter_map(|doc| {
                let embedding = doc.embedding.as_ref()?;
                Some((doc.id.clone(), cosine_similarity(query_embedding, embedding)))
            })
            .collect();

        let lexical = inner.lexical.search(query_text, inner.documents.len());

        let semantic_norm: HashMap<String, f32> =
            min_max_normalize(&semantic).into_iter().collect();
        let lexical_norm: HashMap<String, f32> = min_max_normalize(&lexical).into_iter().collect();

        let mut blended: Vec<(String, f32)> = semantic_norm
            .iter()
            .map(|(id, sem)| {
                let lex = lexical_norm.get(id).copied().unwrap_or(0.0);
                (id.clone(), alpha * sem + (1.0 - alpha) * lex)
            })
            .collect();

        blended.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        blended.truncate(top_k);

        debug!(
            query = query_text,
            candidates = blended.len(),
            "hybrid query completed"
        );

        Ok(blended
            .into_iter()
            .filter_map(|(id, score)| {
                inner.documents.get(&id).map(|doc| {
                    let mut doc = doc.clone();
                    doc.embedding = None;
                    (doc, score)
                })
            })
            .collect())
    }

    /// Persist the collection to its directory, overwriting prior state.
    pub async fn save(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Store(format!("failed to create collection dir: {}", e)))?;

        let metadata = CollectionMetadata {
            name: self.name.clone(),
            dimensions: self.dimensions,
        };
        let metadata_json = serde_json::to_string_pretty(&metadata)
            .map_err(|e| AppError::Store(format!("failed to serialize metadata: {}", e)))?;
        tokio::fs::write(self.dir.join("metadata.json"), metadata_json)
            .await
            .map_err(|e| AppError::Store(format!("failed to write metadata: {}", e)))?;

        let records: Vec<Document> = {
            let inner = self.inner.read();
            let mut ids: Vec<&String> = inner.documents.keys().collect();
            ids.sort();
            ids.iter()
                .filter_map(|id| inner.documents.get(*id).cloned())
                .collect()
        };
        let records_json = serde_json::to_string(&records)
            .map_err(|e| AppError::Store(format!("failed to serialize records: {}", e)))?;
        tokio::fs::write(self.dir.join("records.json"), records_json)
            .await
            .map_err(|e| AppError::Store(format!("failed to write records: {}", e)))?;

        info!(name = self.name.as_str(), count = records.len(), "saved collection");
        Ok(())
    }

    /// Directory this collection persists into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
