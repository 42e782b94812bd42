pub mod decide;
pub mod queue;
pub mod stats;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/admin endpoints (mounted at /api/admin).
/// Every handler takes the AdminUser extractor, so non-admins get 403.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", get(queue::review_queue))
        .route("/stats", get(stats::moderation_stats))
        .route("/recipes/{id}/decision", post(decide::decide_recipe))
}

#[derive(OpenApi)]
#[openapi(
    paths(queue::review_queue, stats::moderation_stats, decide::decide_recipe),
    components(schemas(
        queue::ReviewQueueResponse,
        queue::PendingRecipe,
        stats::ModerationStatsResponse,
        decide::DecideRecipeRequest,
        decide::Decision,
    ))
)]
pub struct ApiDoc;
