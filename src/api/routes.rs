use crate::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the application router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(crate::api::handlers::assets::index))
        .route("/assets/{*path}", get(crate::api::handlers::assets::asset))
        .route("/api/health", get(crate::api::handlers::health::health))
        .route(
            "/api/sessions",
            post(crate::api::handlers::sessions::create_session),
        )
        .route(
            "/api/sessions/{id}",
            get(crate::api::handlers::sessions::session_history),
        )
        .route("/api/chat", post(crate::api::handlers::chat::chat))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
