use crate::api::recipes::average_rating_sql;
use crate::api::recipes::list::RecipeSummary;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::ModerationStatus;
use crate::schema::{favorites, recipes, users};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FavoritesResponse {
    pub recipes: Vec<RecipeSummary>,
}

#[derive(Queryable)]
struct FavoriteRow {
    id: Uuid,
    title: String,
    ingredients: Vec<Option<String>>,
    preparation_minutes: i32,
    meal_type: Option<String>,
    photo_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    author_name: String,
    average_rating: f64,
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = "favorites",
    responses(
        (status = 200, description = "The caller's favorited recipes", body = FavoritesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_favorites(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    // A favorited recipe that has since been rejected or deleted drops out
    // of the list rather than erroring
    let rows: Vec<FavoriteRow> = match favorites::table
        .inner_join(recipes::table.inner_join(users::table))
        .filter(favorites::user_id.eq(user.id))
        .filter(recipes::status.eq(ModerationStatus::Approved.as_str()))
        .filter(recipes::deleted_at.is_null())
        .order(favorites::created_at.desc())
        .select((
            recipes::id,
            recipes::title,
            recipes::ingredients,
            recipes::preparation_minutes,
            recipes::meal_type,
            recipes::photo_id,
            recipes::created_at,
            users::display_name,
            average_rating_sql(),
        ))
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch favorites: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch favorites".to_string(),
                }),
            )
                .into_response();
        }
    };

    let recipes = rows
        .into_iter()
        .map(|r| RecipeSummary {
            id: r.id,
            title: r.title,
            ingredients: r.ingredients.into_iter().flatten().collect(),
            preparation_minutes: r.preparation_minutes,
            meal_type: r.meal_type.and_then(|m| m.parse().ok()),
            photo_id: r.photo_id,
            author_name: r.author_name,
            average_rating: r.average_rating,
            created_at: r.created_at,
        })
        .collect();

    (StatusCode::OK, Json(FavoritesResponse { recipes })).into_response()
}
