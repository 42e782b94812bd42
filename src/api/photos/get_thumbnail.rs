use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::photos;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/photos/{id}/thumbnail",
    tag = "photos",
    params(
        ("id" = Uuid, Path, description = "Photo ID")
    ),
    responses(
        (status = 200, description = "JPEG thumbnail bytes"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Photo not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_thumbnail(
    AuthUser(_user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let result: Result<Vec<u8>, _> = photos::table
        .filter(photos::id.eq(id))
        .filter(photos::deleted_at.is_null())
        .select(photos::thumbnail)
        .first(&mut conn);

    match result {
        // Thumbnails are always encoded as JPEG at upload time
        Ok(thumbnail) => {
            ([(header::CONTENT_TYPE, "image/jpeg")], thumbnail).into_response()
        }
        Err(diesel::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Photo not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch thumbnail: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch thumbnail".to_string(),
                }),
            )
                .into_response()
        }
    }
}
