//! Environment-based configuration.
//!
//! All configuration comes from the process environment, optionally seeded
//! from a `.env` file in the working directory. The only required value is
//! `GOOGLE_API_KEY`; everything else has a default matching the standard
//! deployment layout.

use crate::types::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub rag: RagConfig,
    pub ingest: IngestConfig,
    pub eval: EvalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API key for the Gemini API. Required.
    pub google_api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// On-disk root of the persistent vector store.
    pub path: PathBuf,
    /// Name of the collection holding the support documents.
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagConfig {
    /// Local directory holding the embedding / reranker model weights.
    pub embed_model_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Candidates fetched by hybrid retrieval before reranking.
    pub retrieve_top_k: usize,
    /// Blend between semantic and lexical scores (1.0 = purely semantic).
    pub hybrid_alpha: f32,
    /// Candidates kept after cross-encoder reranking.
    pub rerank_top_n: usize,
    /// Token budget for the rolling conversation memory.
    pub memory_token_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Directory scanned for source documents.
    pub input_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvalConfig {
    /// Path the JSON report is written to (overwritten on each run).
    pub output_path: PathBuf,
    /// Pause between questions, to respect provider rate limits.
    pub pause_secs: u64,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] naming the offending variable if
    /// `GOOGLE_API_KEY` is missing or a numeric value fails to parse.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let google_api_key = env::var("GOOGLE_API_KEY").map_err(|_| {
            AppError::Configuration(
                "GOOGLE_API_KEY is not set - add it to .env or the environment".to_string(),
            )
        })?;

        Ok(Config {
            server: ServerConfig {
                host: env_or("HOST", "127.0.0.1"),
                port: env_parse("PORT", 3000)?,
            },
            llm: LlmConfig {
                google_api_key,
                model: env_or("GEMINI_MODEL", "gemini-2.5-pro"),
            },
            store: StoreConfig {
                path: PathBuf::from(env_or("VECTOR_STORE_PATH", "./data/vectors")),
                collection: env_or("COLLECTION_NAME", "support_docs"),
            },
            rag: RagConfig {
                embed_model_dir: PathBuf::from(env_or("EMBED_MODEL_DIR", "./models/embeddings")),
                chunk_size: env_parse("CHUNK_SIZE", 1000)?,
                chunk_overlap: env_parse("CHUNK_OVERLAP", 200)?,
                retrieve_top_k: env_parse("RETRIEVE_TOP_K", 10)?,
                hybrid_alpha: env_parse("HYBRID_ALPHA", 0.5)?,
                rerank_top_n: env_parse("RERANK_TOP_N", 3)?,
                memory_token_limit: env_parse("MEMORY_TOKEN_LIMIT", 3000)?,
            },
            ingest: IngestConfig {
                input_dir: PathBuf::from(env_or("INGEST_INPUT_DIR", "./data")),
            },
            eval: EvalConfig {
                output_path: PathBuf::from(env_or("EVAL_OUTPUT_PATH", "./rag_eval_results.json")),
                pause_secs: env_parse("EVAL_PAUSE_SECS", 2)?,
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|e| {
            AppError::Configuration(format!("invalid value for {}: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global, so all mutation happens in a
    // single test to avoid races between parallel test threads.
    #[test]
    fn test_from_env_requires_api_key_and_applies_defaults() {
        env::remove_var("GOOGLE_API_KEY");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));

        env::set_var("GOOGLE_API_KEY", "test-key");
        env::remove_var("PORT");
        env::remove_var("HYBRID_ALPHA");
        let config = Config::from_env().unwrap();
        assert_eq!(config.llm.google_api_key, "test-key");
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.rag.retrieve_top_k, 10);
        assert_eq!(config.rag.rerank_top_n, 3);
        assert_eq!(config.rag.memory_token_limit, 3000);
        assert!((config.rag.hybrid_alpha - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.store.collection, "support_docs");

        env::set_var("PORT", "not-a-port");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("PORT"));

        env::remove_var("PORT");
        env::remove_var("GOOGLE_API_KEY");
    }
}
