pub mod chat;

use crate::AppState;
use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/assistant endpoints (mounted at
/// /api/assistant)
pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat::chat))
}

#[derive(OpenApi)]
#[openapi(
    paths(chat::chat),
    components(schemas(
        chat::ChatRequest,
        chat::ChatResponse,
        crate::assistant::ChatMessage,
        crate::assistant::ChatRole,
    ))
)]
pub struct ApiDoc;
