//! # S.A.G.E - Sourced Answer Generation Engine
//!
//! A retrieval-augmented support chatbot built in Rust: documents are
//! ingested into a local hybrid-search vector store, and at query time the
//! engine retrieves and reranks relevant passages, then streams a grounded
//! answer with cited sources to a browser chat UI.
//!
//! ## Overview
//!
//! S.A.G.E can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `sage-server` binary
//! 2. **As a library** - Import components into your own Rust project
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sage::{engine::ChatEngine, utils::config::Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let engine = ChatEngine::assemble(&config).await?;
//!
//!     let reply = engine.chat("What is EC2?").await?;
//!     println!("{}", reply.answer);
//!     for source in &reply.sources {
//!         println!("  [{} p.{}]", source.file_name, source.page_label);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! Each user turn flows through the condense-plus-context strategy:
//!
//! 1. **Condense** - the turn is rewritten into a standalone question
//!    using conversation history
//! 2. **Retrieve** - hybrid (semantic + lexical) search returns the top
//!    candidates from the collection
//! 3. **Rerank** - a cross-encoder re-scores the candidates and keeps the
//!    best few
//! 4. **Generate** - the LLM answers from the retrieved context plus
//!    history, streaming tokens to the UI
//!
//! ## Modules
//!
//! - [`engine`] - chat engine assembly and the query pipeline
//! - [`db`] - the embedded, file-backed vector store
//! - [`rag`] - embeddings, chunking, lexical search, reranking, loading
//! - [`llm`] - the Gemini client behind the [`llm::LlmClient`] trait
//! - [`memory`] - token-budgeted conversation memory
//! - [`ingest`] - the document ingestion pipeline
//! - [`eval`] - the offline evaluation harness
//! - [`api`] - HTTP routes and the streaming chat endpoint
//! - [`session`] - per-browser chat sessions
//! - [`types`] - common types and error handling

#![warn(missing_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// CLI parsing and colored output.
pub mod cli;
/// Embedded, file-backed vector store.
pub mod db;
/// Chat engine assembly and the query pipeline.
pub mod engine;
/// Offline evaluation harness.
pub mod eval;
/// Document ingestion pipeline.
pub mod ingest;
/// LLM provider clients and abstractions.
pub mod llm;
/// Conversation memory.
pub mod memory;
/// Retrieval components (embeddings, search, reranking, chunking, loading).
pub mod rag;
/// Per-browser chat sessions.
pub mod session;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use db::{Collection, CollectionSummary, VectorDb};
pub use engine::{ChatEngine, ChatEngineBuilder, ChatReply, ChatStream};
pub use llm::{GeminiClient, LlmClient};
pub use session::SessionStore;
pub use types::{AppError, Result};
pub use utils::config::Config;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Environment-derived configuration
    pub config: Arc<Config>,
    /// The assembled chat engine, shared for the process lifetime
    pub engine: Arc<ChatEngine>,
    /// Live chat sessions
    pub sessions: Arc<SessionStore>,
}
