/// Embedded chat UI assets.
pub mod assets;
/// Streaming chat endpoint.
pub mod chat;
/// Health check endpoint.
pub mod health;
/// Session lifecycle endpoints.
pub mod sessions;
