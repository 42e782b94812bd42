pub mod list;
pub mod toggle;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/favorites endpoints (mounted at
/// /api/favorites). The toggle route lives under /api/recipes/{id}/favorite
/// in the recipes router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list::list_favorites))
}

#[derive(OpenApi)]
#[openapi(
    paths(toggle::toggle_favorite, list::list_favorites),
    components(schemas(toggle::ToggleFavoriteResponse, list::FavoritesResponse))
)]
pub struct ApiDoc;
