//! HTTP API handlers and routes.
//!
//! The whole surface is the single-page chat UI plus four endpoints:
//!
//! - `GET /` - the chat page
//! - `GET /api/health` - health check
//! - `POST /api/sessions` - create a chat session
//! - `GET /api/sessions/{id}` - ordered turns of a session
//! - `POST /api/chat` - answer one turn as a server-sent-event stream
//!
//! No authentication; the server is a single-user local tool.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
