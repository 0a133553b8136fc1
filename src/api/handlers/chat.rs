//! The streaming chat endpoint.
//!
//! One user turn per request: the turn is appended to the session, the
//! engine streams the answer back as server-sent events, and once the
//! stream ends the full assistant message is appended to the session.
//! Event order is `token`* then `sources` then `done`; generation failures
//! surface as an `error` event rather than being swallowed.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::Stream;
use tracing::warn;

use crate::types::{AppError, ChatRequest, MessageRole, Result};
use crate::AppState;

/// Answer one chat turn as a server-sent-event stream
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "SSE stream of token, sources, and done events"),
        (status = 404, description = "Unknown session")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    if !state.sessions.exists(payload.session_id) {
        return Err(AppError::NotFound(format!(
            "session '{}' not found",
            payload.session_id
        )));
    }

    state
        .sessions
        .append(payload.session_id, MessageRole::User, &payload.message)?;

    let engine = Arc::clone(&state.engine);
    let sessions = Arc::clone(&state.sessions);
    let session_id = payload.session_id;
    let message = payload.message;

    let stream = async_stream::stream! {
        match engine.stream_chat(&message).await {
            Err(e) => {
                warn!(error = %e, "chat generation failed");
                yield Ok(Event::default().event("error").data(e.to_string()));
            }
            Ok(mut chat_stream) => {
                let mut answer = String::new();

                while let Some(fragment) = chat_stream.next_fragment().await {
                    match fragment {
                        Ok(text) => {
                            answer.push_str(&text);
                            yield Ok(Event::default().event("token").data(text));
                        }
                        Err(e) => {
                            warn!(error = %e, "stream error mid-generation");
                            yield Ok(Event::default().event("error").data(e.to_string()));
                        }
                    }
                }

                let sources_json = serde_json::to_string(chat_stream.sources())
                    .unwrap_or_else(|_| "[]".to_string());
                yield Ok(Event::default().event("sources").data(sources_json));

                if !answer.is_empty() {
                    if let Err(e) =
                        sessions.append(session_id, MessageRole::Assistant, &answer)
                    {
                        warn!(error = %e, "failed to record assistant turn");
                    }
                }

                yield Ok(Event::default().event("done").data("end"));
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
