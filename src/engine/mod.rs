//! The conversational engine.
//!
//! [`ChatEngine::assemble`] wires the production components together in one
//! eager pass - credential, LLM client, vector store, embedding model,
//! retrieval parameters, reranker, memory, system prompt - and fails fast
//! with an error naming the missing piece. Callers hold one shared instance
//! for the process lifetime; there is no partially-assembled engine.
//!
//! Each query follows the condense-plus-context strategy: a follow-up turn
//! is first rewritten into a standalone question using the conversation
//! history, the rewritten question drives hybrid retrieval and reranking,
//! and the answer is generated from the retrieved context plus history.

pub mod prompt;

use std::pin::Pin;
use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::db::{Collection, VectorDb};
use crate::llm::client::ChatTurn;
use crate::llm::{GeminiClient, LlmClient};
use crate::memory::ChatMemoryBuffer;
use crate::rag::embeddings::{Embedder, FastembedEmbedder};
use crate::rag::reranker::{CrossEncoderReranker, Reranker};
use crate::types::{AppError, Message, MessageRole, Result, SourceNode};
use crate::utils::config::Config;
use prompt::{build_condense_prompt, build_context_block, build_system_prompt};

/// How many example IDs / file names the system prompt samples.
const SAMPLE_LIMIT: usize = 5;

/// A completed single-shot answer with its retrieved sources.
#[derive(Debug)]
pub struct ChatReply {
    pub answer: String,
    pub sources: Vec<SourceNode>,
}

/// Handle over an in-flight streamed answer.
///
/// Fragments are consumed once via [`next_fragment`](Self::next_fragment);
/// the stream cannot be restarted. Sources were resolved during retrieval
/// and are available for rendering once the stream has been drained. The
/// accumulated answer is committed to the engine's memory when the stream
/// ends.
pub struct ChatStream {
    inner: Pin<Box<dyn Stream<Item = Result<String>> + Send>>,
    sources: Vec<SourceNode>,
}

impl ChatStream {
    /// Await the next text fragment; `None` marks end-of-stream.
    pub async fn next_fragment(&mut self) -> Option<Result<String>> {
        self.inner.next().await
    }

    /// Retrieved sources backing this answer.
    pub fn sources(&self) -> &[SourceNode] {
        &self.sources
    }
}

/// The assembled conversational engine.
pub struct ChatEngine {
    llm: Box<dyn LlmClient>,
    embedder: Arc<dyn Embedder>,
    reranker: Arc<dyn Reranker>,
    collection: Arc<Collection>,
    memory: Arc<Mutex<ChatMemoryBuffer>>,
    system_prompt: String,
    retrieve_top_k: usize,
    hybrid_alpha: f32,
    rerank_top_n: usize,
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine")
            .field("system_prompt", &self.system_prompt)
            .field("retrieve_top_k", &self.retrieve_top_k)
            .field("hybrid_alpha", &self.hybrid_alpha)
            .field("rerank_top_n", &self.rerank_top_n)
            .finish_non_exhaustive()
    }
}

impl ChatEngine {
    /// Assemble the production engine from configuration.
    ///
    /// Every step must succeed; the first failure aborts assembly with an
    /// error naming the missing resource:
    ///
    /// 1. the API credential must be present,
    /// 2. the LLM client is constructed,
    /// 3. the vector store is opened and the collection fetched (ingestion
    ///    must have run),
    /// 4. the embedding model is loaded from its local directory,
    /// 5.-7. retriever, reranker, and memory are configured,
    /// 8. the collection is sampled into the system prompt,
    /// 9. everything is composed into the engine.
    pub async fn assemble(config: &Config) -> Result<Self> {
        if config.llm.google_api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "GOOGLE_API_KEY is not set - add it to .env or the environment".to_string(),
            ));
        }

        let llm = GeminiClient::new(
            config.llm.google_api_key.clone(),
            config.llm.model.clone(),
        )?;

        let db = VectorDb::open(&config.store.path).await?;
        let collection = db.get_collection(&config.store.collection)?;

        let embedder = Arc::new(FastembedEmbedder::new(&config.rag.embed_model_dir)?);
        let reranker = Arc::new(CrossEncoderReranker::new(&config.rag.embed_model_dir));

        let summary = collection.summary(SAMPLE_LIMIT);
        info!(
            collection = collection.name(),
            count = summary.count,
            "assembling chat engine"
        );
        let system_prompt = build_system_prompt(&summary);

        ChatEngineBuilder::new()
            .llm(Box::new(llm))
            .embedder(embedder)
            .reranker(reranker)
            .collection(collection)
            .system_prompt(system_prompt)
            .retrieve_top_k(config.rag.retrieve_top_k)
            .hybrid_alpha(config.rag.hybrid_alpha)
            .rerank_top_n(config.rag.rerank_top_n)
            .memory_token_limit(config.rag.memory_token_limit)
            .build()
    }

    /// The engine's embedding provider (shared with the evaluation
    /// harness for answer scoring).
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.embedder)
    }

    /// The interpolated system prompt this engine was assembled with.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Rewrite a follow-up into a standalone question. With no history the
    /// message already stands alone and no LLM call is made.
    async fn condense_question(
        &self,
        history: &[(String, String)],
        message: &str,
    ) -> Result<String> {
        if history.is_empty() {
            return Ok(message.to_string());
        }

        let prompt = build_condense_prompt(history, message);
        let standalone = self.llm.generate(&prompt).await?;
        let standalone = standalone.trim();

        if standalone.is_empty() {
            Ok(message.to_string())
        } else {
            Ok(standalone.to_string())
        }
    }

    /// Retrieve and rerank context for a standalone question.
    async fn retrieve(&self, question: &str) -> Result<Vec<SourceNode>> {
        let embedding = self.embedder.embed(question).await?;
        let candidates = self.collection.query_hybrid(
            question,
            &embedding,
            self.retrieve_top_k,
            self.hybrid_alpha,
        )?;

        let nodes: Vec<SourceNode> = candidates
            .into_iter()
            .map(|(doc, score)| SourceNode {
                content: doc.content,
                file_name: doc.metadata.file_name,
                page_label: doc.metadata.page_label,
                score,
            })
            .collect();

        self.reranker.rerank(question, nodes, self.rerank_top_n).await
    }

    /// Condense, retrieve, and build the provider message list for one turn.
    async fn prepare(&self, message: &str) -> Result<(Vec<ChatTurn>, Vec<SourceNode>)> {
        let history = self.memory.lock().history();
        let question = self.condense_question(&history, message).await?;
        debug!(question = question.as_str(), "condensed question");

        let sources = self.retrieve(&question).await?;

        let mut messages: Vec<ChatTurn> = Vec::with_capacity(history.len() + 2);
        messages.push((
            "system".to_string(),
            format!("{}\n\n{}", self.system_prompt, build_context_block(&sources)),
        ));
        messages.extend(history);
        messages.push(("user".to_string(), message.to_string()));

        Ok((messages, sources))
    }

    /// Answer one turn single-shot (used by the evaluation harness).
    /// Provider errors propagate to the caller.
    pub async fn chat(&self, message: &str) -> Result<ChatReply> {
        let (messages, sources) = self.prepare(message).await?;
        let answer = self.llm.generate_with_history(&messages).await?;

        {
            let mut memory = self.memory.lock();
            memory.push(Message::new(MessageRole::User, message));
            memory.push(Message::new(MessageRole::Assistant, answer.clone()));
        }

        Ok(ChatReply { answer, sources })
    }

    /// Answer one turn as a stream of text fragments.
    ///
    /// The user turn is recorded immediately; the assistant turn is
    /// committed to memory once the returned stream has ended.
    pub async fn stream_chat(&self, message: &str) -> Result<ChatStream> {
        let (messages, sources) = self.prepare(message).await?;
        let mut upstream = self.llm.stream(&messages).await?;

        self.memory
            .lock()
            .push(Message::new(MessageRole::User, message));

        let memory = Arc::clone(&self.memory);
        let wrapped = stream! {
            let mut answer = String::new();

            while let Some(item) = upstream.next().await {
                if let Ok(fragment) = &item {
                    answer.push_str(fragment);
                }
                yield item;
            }

            if !answer.is_empty() {
                memory
                    .lock()
                    .push(Message::new(MessageRole::Assistant, answer));
            }
        };

        Ok(ChatStream {
            inner: Box::pin(wrapped),
            sources,
        })
    }
}

/// Builder composing a [`ChatEngine`] from its parts.
///
/// [`ChatEngine::assemble`] uses it with the production components; tests
/// compose engines from mock implementations of the same traits.
pub struct ChatEngineBuilder {
    llm: Option<Box<dyn LlmClient>>,
    embedder: Option<Arc<dyn Embedder>>,
    reranker: Option<Arc<dyn Reranker>>,
    collection: Option<Arc<Collection>>,
    system_prompt: Option<String>,
    retrieve_top_k: usize,
    hybrid_alpha: f32,
    rerank_top_n: usize,
    memory_token_limit: usize,
}

impl Default for ChatEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatEngineBuilder {
    /// Create a builder with the standard retrieval parameters.
    pub fn new() -> Self {
        Self {
            llm: None,
            embedder: None,
            reranker: None,
            collection: None,
            system_prompt: None,
            retrieve_top_k: 10,
            hybrid_alpha: 0.5,
            rerank_top_n: 3,
            memory_token_limit: 3000,
        }
    }

    /// Set the LLM client.
    pub fn llm(mut self, llm: Box<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the reranker.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Set the collection to retrieve from.
    pub fn collection(mut self, collection: Arc<Collection>) -> Self {
        self.collection = Some(collection);
        self
    }

    /// Set the system prompt. When unset, `build` samples the collection.
    pub fn system_prompt(mut self, system_prompt: String) -> Self {
        self.system_prompt = Some(system_prompt);
        self
    }

    /// Candidates fetched by hybrid retrieval.
    pub fn retrieve_top_k(mut self, top_k: usize) -> Self {
        self.retrieve_top_k = top_k;
        self
    }

    /// Semantic/lexical blend factor.
    pub fn hybrid_alpha(mut self, alpha: f32) -> Self {
        self.hybrid_alpha = alpha;
        self
    }

    /// Candidates kept after reranking.
    pub fn rerank_top_n(mut self, top_n: usize) -> Self {
        self.rerank_top_n = top_n;
        self
    }

    /// Token budget for conversation memory.
    pub fn memory_token_limit(mut self, limit: usize) -> Self {
        self.memory_token_limit = limit;
        self
    }

    /// Build the engine, validating that all required parts are present.
    pub fn build(self) -> Result<ChatEngine> {
        let llm = self
            .llm
            .ok_or_else(|| AppError::Configuration("llm client is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| AppError::Configuration("embedder is required".to_string()))?;
        let reranker = self
            .reranker
            .ok_or_else(|| AppError::Configuration("reranker is required".to_string()))?;
        let collection = self
            .collection
            .ok_or_else(|| AppError::Configuration("collection is required".to_string()))?;

        let system_prompt = self
            .system_prompt
            .unwrap_or_else(|| build_system_prompt(&collection.summary(SAMPLE_LIMIT)));

        Ok(ChatEngine {
            llm,
            embedder,
            reranker,
            collection,
            memory: Arc::new(Mutex::new(ChatMemoryBuffer::new(self.memory_token_limit))),
            system_prompt,
            retrieve_top_k: self.retrieve_top_k,
            hybrid_alpha: self.hybrid_alpha,
            rerank_top_n: self.rerank_top_n,
        })
    }
}
