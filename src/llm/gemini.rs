//! Google Gemini API client.
//!
//! Key differences from OpenAI-compatible APIs:
//! - Auth via `?key=API_KEY` query parameter (not header-based)
//! - System messages map to the top-level `systemInstruction` field
//! - Roles are `"user"` / `"model"` (not `"assistant"`)
//! - Streaming uses the `streamGenerateContent` endpoint with `?alt=sse`

use crate::llm::client::{ChatTurn, LlmClient};
use crate::types::{AppError, Result};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, warn};

/// The default Google Gemini API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client for hosted inference.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client for the given API key and model identifier
    /// (e.g. `gemini-2.5-pro`).
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Override the API base URL (used by tests against a local mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url, self.model, method, self.api_key
        )
    }

    fn stream_endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Build the JSON request body for the Gemini API.
    ///
    /// System turns are collected into the top-level `systemInstruction`
    /// field; the remaining turns become `contents` with the assistant role
    /// renamed to `"model"`.
    fn build_request_body(messages: &[ChatTurn]) -> Value {
        let mut system_parts: Vec<String> = Vec::new();
        let mut contents: Vec<Value> = Vec::new();

        for (role, content) in messages {
            match role.as_str() {
                "system" => system_parts.push(content.clone()),
                role => {
                    let gemini_role = if role == "assistant" { "model" } else { "user" };
                    contents.push(serde_json::json!({
                        "role": gemini_role,
                        "parts": [{"text": content}],
                    }));
                }
            }
        }

        let mut body = serde_json::json!({ "contents": contents });

        if !system_parts.is_empty() {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{"text": system_parts.join("\n\n")}]
            });
        }

        body
    }

    /// Extract the concatenated text parts of the first candidate.
    fn extract_text(data: &Value) -> Option<String> {
        let parts = data["candidates"][0]["content"]["parts"].as_array()?;
        let text: String = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect();
        Some(text)
    }

    fn map_http_error(status: reqwest::StatusCode, body: &str) -> AppError {
        AppError::Llm(format!("Gemini API error (HTTP {}): {}", status, body))
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_history(&[("user".to_string(), prompt.to_string())])
            .await
    }

    async fn generate_with_history(&self, messages: &[ChatTurn]) -> Result<String> {
        let body = Self::build_request_body(messages);
        let url = self.endpoint_url("generateContent");

        debug!(model = self.model.as_str(), "sending Gemini completion request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Request to Gemini API failed: {}", e)))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text));
        }

        let data: Value = serde_json::from_str(&body_text)
            .map_err(|e| AppError::Llm(format!("Invalid JSON in response: {}", e)))?;

        Self::extract_text(&data)
            .ok_or_else(|| AppError::Llm("No candidates in Gemini response".to_string()))
    }

    async fn stream(
        &self,
        messages: &[ChatTurn],
    ) -> Result<Box<dyn futures::Stream<Item = Result<String>> + Send + Unpin>> {
        let body = Self::build_request_body(messages);
        let url = self.stream_endpoint_url();

        debug!(model = self.model.as_str(), "sending Gemini streaming request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Streaming request to Gemini API failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body_text));
        }

        let mut byte_stream = response.bytes_stream();

        // Parse the SSE response incrementally: buffer bytes into lines and
        // decode every `data: {...}` payload as one generation chunk.
        let output_stream = stream! {
            let mut line_buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(AppError::Llm(format!("Failed to read streaming chunk: {}", e)));
                        break;
                    }
                };

                line_buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline_pos) = line_buffer.find('\n') {
                    let line = line_buffer[..newline_pos].trim().to_string();
                    line_buffer = line_buffer[newline_pos + 1..].to_string();

                    if let Some(text) = parse_sse_line(&line) {
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                }
            }

            // Anything left in the buffer is a final unterminated data line.
            let remaining = line_buffer.trim().to_string();
            if let Some(text) = parse_sse_line(&remaining) {
                if !text.is_empty() {
                    yield Ok(text);
                }
            }
        };

        Ok(Box::new(Box::pin(output_stream)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Decode one SSE line into its text fragment, if it carries one.
fn parse_sse_line(line: &str) -> Option<String> {
    let data_str = line.strip_prefix("data: ")?;
    if data_str == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<Value>(data_str) {
        Ok(data) => GeminiClient::extract_text(&data),
        Err(e) => {
            warn!(error = %e, "failed to parse Gemini SSE chunk");
            None
        }
    }
}
