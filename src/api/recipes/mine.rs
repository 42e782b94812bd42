use crate::api::recipes::average_rating_sql;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{MealType, ModerationStatus};
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Dashboard view of the caller's own submissions, including their
/// moderation status.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnRecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub preparation_minutes: i32,
    pub meal_type: Option<MealType>,
    pub photo_id: Option<Uuid>,
    pub status: ModerationStatus,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyRecipesResponse {
    pub recipes: Vec<OwnRecipeSummary>,
}

#[derive(Queryable)]
struct OwnRecipeRow {
    id: Uuid,
    title: String,
    preparation_minutes: i32,
    meal_type: Option<String>,
    photo_id: Option<Uuid>,
    status: String,
    created_at: DateTime<Utc>,
    average_rating: f64,
}

#[utoipa::path(
    get,
    path = "/api/recipes/mine",
    tag = "recipes",
    responses(
        (status = 200, description = "The caller's own recipes, any status", body = MyRecipesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<OwnRecipeRow> = match recipes::table
        .filter(recipes::user_id.eq(user.id))
        .filter(recipes::deleted_at.is_null())
        .order(recipes::created_at.desc())
        .select((
            recipes::id,
            recipes::title,
            recipes::preparation_minutes,
            recipes::meal_type,
            recipes::photo_id,
            recipes::status,
            recipes::created_at,
            average_rating_sql(),
        ))
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch own recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let recipes = rows
        .into_iter()
        .map(|r| OwnRecipeSummary {
            id: r.id,
            title: r.title,
            preparation_minutes: r.preparation_minutes,
            meal_type: r.meal_type.and_then(|m| m.parse().ok()),
            photo_id: r.photo_id,
            status: r.status.parse().unwrap_or(ModerationStatus::Pending),
            average_rating: r.average_rating,
            created_at: r.created_at,
        })
        .collect();

    (StatusCode::OK, Json(MyRecipesResponse { recipes })).into_response()
}
