//! LLM provider clients and abstractions.
//!
//! The [`client::LlmClient`] trait is the seam between the chat engine and
//! the hosted model; [`gemini::GeminiClient`] is the production
//! implementation against the Google Gemini API.

pub mod client;
pub mod gemini;

pub use client::LlmClient;
pub use gemini::GeminiClient;
