//! Mock implementations for testing.
//!
//! Scripted LLM, embedder, and reranker implementations of the engine's
//! trait seams, so pipelines can be exercised without network access or
//! model downloads.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;

use sage::llm::client::{ChatTurn, LlmClient};
use sage::rag::embeddings::Embedder;
use sage::rag::reranker::Reranker;
use sage::types::{AppError, Result, SourceNode};

/// Mock LLM client with a fixed response and configurable failures.
pub struct MockLlmClient {
    response: String,
    /// When set, the nth `generate_with_history` call (0-based) fails.
    fail_on_answer: Option<usize>,
    /// When true, every call fails.
    fail_always: bool,
    answer_calls: AtomicUsize,
    /// Prompts passed to `generate` (the condense path).
    pub generate_prompts: Mutex<Vec<String>>,
    /// Message lists passed to `generate_with_history`.
    pub recorded_messages: Mutex<Vec<Vec<ChatTurn>>>,
}

impl MockLlmClient {
    /// Client that always answers with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            fail_on_answer: None,
            fail_always: false,
            answer_calls: AtomicUsize::new(0),
            generate_prompts: Mutex::new(Vec::new()),
            recorded_messages: Mutex::new(Vec::new()),
        }
    }

    /// Client whose nth answer generation (0-based) fails.
    pub fn fail_on_answer(response: &str, n: usize) -> Self {
        Self {
            fail_on_answer: Some(n),
            ..Self::new(response)
        }
    }

    /// Client that always returns an error.
    pub fn failing() -> Self {
        Self {
            fail_always: true,
            ..Self::new("")
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.fail_always {
            return Err(AppError::Llm("mock LLM failure".to_string()));
        }
        self.generate_prompts.lock().push(prompt.to_string());
        Ok(self.response.clone())
    }

    async fn generate_with_history(&self, messages: &[ChatTurn]) -> Result<String> {
        let call = self.answer_calls.fetch_add(1, Ordering::SeqCst);
        self.recorded_messages.lock().push(messages.to_vec());

        if self.fail_always || self.fail_on_answer == Some(call) {
            return Err(AppError::Llm("mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    async fn stream(
        &self,
        messages: &[ChatTurn],
    ) -> Result<Box<dyn futures::Stream<Item = Result<String>> + Send + Unpin>> {
        let call = self.answer_calls.fetch_add(1, Ordering::SeqCst);
        self.recorded_messages.lock().push(messages.to_vec());

        if self.fail_always || self.fail_on_answer == Some(call) {
            return Err(AppError::Llm("mock LLM failure".to_string()));
        }

        // Stream the response word by word, the way a provider would.
        let fragments: Vec<Result<String>> = self
            .response
            .split_inclusive(' ')
            .map(|word| Ok(word.to_string()))
            .collect();

        Ok(Box::new(Box::pin(stream::iter(fragments))))
    }

    fn model_name(&self) -> &str {
        "mock-llm"
    }
}

/// Deterministic embedder: an 8-dimensional letter-frequency histogram.
/// Similar texts map to similar vectors, which is enough for retrieval
/// and similarity scoring in tests.
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self { dimensions: 8 }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for c in text.to_lowercase().chars().filter(|c| c.is_alphanumeric()) {
            vector[(c as usize) % self.dimensions] += 1.0;
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embedder that always fails, for exercising abort paths.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(AppError::Embedding("mock embedding failure".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(AppError::Embedding("mock embedding failure".to_string()))
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// Reranker that scores candidates by case-insensitive query-word overlap.
pub struct OverlapReranker;

#[async_trait]
impl Reranker for OverlapReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SourceNode>,
        top_n: usize,
    ) -> Result<Vec<SourceNode>> {
        let query_words: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(String::from)
            .collect();

        let mut reranked: Vec<SourceNode> = candidates
            .into_iter()
            .map(|mut node| {
                let content = node.content.to_lowercase();
                node.score = query_words
                    .iter()
                    .filter(|word| content.contains(word.as_str()))
                    .count() as f32;
                node
            })
            .collect();

        reranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        reranked.truncate(top_n);
        Ok(reranked)
    }
}
