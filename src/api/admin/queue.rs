use crate::api::ErrorResponse;
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::ModerationStatus;
use crate::schema::{recipes, users};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PendingRecipe {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub preparation_minutes: i32,
    pub photo_id: Option<Uuid>,
    pub author_id: Uuid,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewQueueResponse {
    pub recipes: Vec<PendingRecipe>,
}

#[derive(Queryable)]
struct PendingRow {
    id: Uuid,
    title: String,
    ingredients: Vec<Option<String>>,
    preparation_minutes: i32,
    photo_id: Option<Uuid>,
    author_id: Uuid,
    author_name: String,
    created_at: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/api/admin/queue",
    tag = "admin",
    responses(
        (status = 200, description = "Pending recipes, oldest first", body = ReviewQueueResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrator access required", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn review_queue(
    AdminUser(_admin): AdminUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    // FIFO review queue: oldest submission first
    let rows: Vec<PendingRow> = match recipes::table
        .inner_join(users::table)
        .filter(recipes::status.eq(ModerationStatus::Pending.as_str()))
        .filter(recipes::deleted_at.is_null())
        .order(recipes::created_at.asc())
        .select((
            recipes::id,
            recipes::title,
            recipes::ingredients,
            recipes::preparation_minutes,
            recipes::photo_id,
            recipes::user_id,
            users::display_name,
            recipes::created_at,
        ))
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch review queue: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch review queue".to_string(),
                }),
            )
                .into_response();
        }
    };

    let recipes = rows
        .into_iter()
        .map(|r| PendingRecipe {
            id: r.id,
            title: r.title,
            ingredients: r.ingredients.into_iter().flatten().collect(),
            preparation_minutes: r.preparation_minutes,
            photo_id: r.photo_id,
            author_id: r.author_id,
            author_name: r.author_name,
            created_at: r.created_at,
        })
        .collect();

    (StatusCode::OK, Json(ReviewQueueResponse { recipes })).into_response()
}
