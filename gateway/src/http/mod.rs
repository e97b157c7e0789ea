//! HTTP/SSE surface (C7): settings, introspection, and an OpenAI-compatible
//! chat-completions endpoint, grounded on the router/state/middleware shape
//! used elsewhere in the example pack (the Wyoming TCP side of this gateway
//! has no HTTP precedent of its own to draw on).

mod routes;
mod sse;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::GatewayContext;

/// Builds the full HTTP router over a shared [`GatewayContext`].
pub fn router(ctx: Arc<GatewayContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics))
        .route(
            "/api/wyoming/settings",
            get(routes::get_wyoming_settings).post(routes::post_wyoming_settings),
        )
        .route("/api/wyoming/tts/voices", get(routes::get_voices))
        .route("/api/wyoming/stt/languages", get(routes::get_languages))
        .route("/api/logs", get(routes::get_logs))
        .route("/v1/models", get(routes::list_models))
        .route(
            "/api/llm/settings",
            get(routes::get_llm_settings).post(routes::post_llm_settings),
        )
        .route("/v1/chat/completions", post(routes::chat_completions))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
