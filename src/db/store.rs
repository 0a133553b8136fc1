//! The on-disk vector database: a root directory of named collections.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::db::collection::Collection;
use crate::types::{AppError, Result};

/// Persistent vector store rooted at a fixed on-disk path.
///
/// Opening the store loads every collection found under the root; new
/// collections are created through [`VectorDb::get_or_create_collection`]
/// (the ingestion pipeline is the only writer).
pub struct VectorDb {
    root: PathBuf,
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl VectorDb {
    /// Open the store at `root`, creating the directory if absent and
    /// loading any collections already persisted there.
    pub async fn open(root: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| AppError::Store(format!("failed to create store root: {}", e)))?;

        let mut collections = HashMap::new();

        let mut entries = tokio::fs::read_dir(root)
            .await
            .map_err(|e| AppError::Store(format!("failed to read store root: {}", e)))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Store(format!("failed to scan store root: {}", e)))?
        {
            let path = entry.path();
            if !path.join("metadata.json").exists() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let collection = Collection::load(&name, path).await?;
            collections.insert(name, Arc::new(collection));
        }

        info!(root = %root.display(), collections = collections.len(), "opened vector store");

        Ok(Self {
            root: root.to_path_buf(),
            collections: RwLock::new(collections),
        })
    }

    /// Fetch an existing collection by name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the collection has never been
    /// ingested.
    pub fn get_collection(&self, name: &str) -> Result<Arc<Collection>> {
        self.collections.read().get(name).cloned().ok_or_else(|| {
            AppError::NotFound(format!(
                "collection '{}' not found in '{}' - run `sage-server ingest` first",
                name,
                self.root.display()
            ))
        })
    }

    /// Fetch a collection, creating an empty one if it does not exist.
    pub fn get_or_create_collection(&self, name: &str, dimensions: usize) -> Arc<Collection> {
        let mut collections = self.collections.write();
        Arc::clone(collections.entry(name.to_string()).or_insert_with(|| {
            info!(name, dimensions, "creating collection");
            Arc::new(Collection::create(name, dimensions, self.root.join(name)))
        }))
    }

    /// Names of all loaded collections.
    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }
}
