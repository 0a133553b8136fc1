use crate::{
    AppState,
    types::{Result, SessionCreated, SessionHistory},
};
use axum::{Json, extract::Path, extract::State};
use uuid::Uuid;

/// Create a new chat session
#[utoipa::path(
    post,
    path = "/api/sessions",
    responses((status = 200, description = "Session created", body = SessionCreated)),
    tag = "sessions"
)]
pub async fn create_session(State(state): State<AppState>) -> Json<SessionCreated> {
    let session_id = state.sessions.create();
    Json(SessionCreated { session_id })
}

/// Get the ordered turns of a session
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session history", body = SessionHistory),
        (status = 404, description = "Unknown session")
    ),
    tag = "sessions"
)]
pub async fn session_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionHistory>> {
    let messages = state.sessions.history(id)?;
    Ok(Json(SessionHistory {
        session_id: id,
        messages,
    }))
}
