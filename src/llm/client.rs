//! LLM client abstraction.
//!
//! All providers implement [`LlmClient`], allowing the chat engine and the
//! evaluation harness to run against mock clients in tests without changing
//! application code.

use crate::types::Result;
use async_trait::async_trait;

/// A `(role, content)` pair in provider wire order. Roles are the lowercase
/// names from [`crate::types::MessageRole::as_str`].
pub type ChatTurn = (String, String);

/// Generic LLM client trait for provider abstraction.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion from a single user prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate a completion from a full message list. A leading `system`
    /// turn becomes the provider's system instruction.
    async fn generate_with_history(&self, messages: &[ChatTurn]) -> Result<String>;

    /// Stream a completion for a full message list.
    ///
    /// The returned stream is lazy, finite, and cannot be restarted: once
    /// the fragments have been consumed the generation is over.
    async fn stream(
        &self,
        messages: &[ChatTurn],
    ) -> Result<Box<dyn futures::Stream<Item = Result<String>> + Send + Unpin>>;

    /// Get the model name/identifier.
    fn model_name(&self) -> &str;
}
