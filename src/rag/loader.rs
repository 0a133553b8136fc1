//! Directory loader for source documents.
//!
//! Reads plain-text and markdown files from the ingest input directory,
//! producing one [`Document`] per file. Loading is deliberately strict: an
//! empty input directory is an error, never a silent no-op.

use std::path::Path;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::types::{AppError, Document, DocumentMetadata, Result};

/// File extensions the loader understands.
const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// Load all supported documents from `input_dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`AppError::Data`] if the directory does not exist or contains
/// no readable documents.
pub fn load_documents(input_dir: &Path) -> Result<Vec<Document>> {
    if !input_dir.is_dir() {
        return Err(AppError::Data(format!(
            "input directory '{}' not found",
            input_dir.display()
        )));
    }

    let mut entries: Vec<_> = std::fs::read_dir(input_dir)
        .map_err(|e| AppError::Data(format!("failed to read '{}': {}", input_dir.display(), e)))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    entries.sort();

    let mut documents = Vec::new();
    for path in entries {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| AppError::Data(format!("failed to read '{}': {}", path.display(), e)))?;

        if content.trim().is_empty() {
            continue;
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!(file = file_name.as_str(), bytes = content.len(), "loaded document");

        documents.push(Document {
            id: Uuid::new_v4().to_string(),
            content,
            metadata: DocumentMetadata {
                file_name,
                page_label: "1".to_string(),
                source: path.display().to_string(),
                created_at: Utc::now(),
            },
            embedding: None,
        });
    }

    if documents.is_empty() {
        return Err(AppError::Data(format!(
            "no documents found in '{}' - add source files before ingesting",
            input_dir.display()
        )));
    }

    Ok(documents)
}
