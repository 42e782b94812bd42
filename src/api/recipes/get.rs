use crate::api::recipes::average_rating_sql;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{MealType, ModerationStatus, Role};
use crate::schema::{favorites, ratings, recipes, users};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub preparation_minutes: i32,
    pub meal_type: Option<MealType>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub photo_id: Option<Uuid>,
    pub author_id: Uuid,
    pub author_name: String,
    pub status: ModerationStatus,
    pub average_rating: f64,
    pub rating_count: i64,
    /// The caller's own rating, if they have rated this recipe
    pub my_rating: Option<i32>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable)]
struct RecipeDetailRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    ingredients: Vec<Option<String>>,
    steps: Vec<Option<String>>,
    preparation_minutes: i32,
    meal_type: Option<String>,
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    photo_id: Option<Uuid>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_name: String,
    average_rating: f64,
    rating_count: i64,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let row: RecipeDetailRow = match recipes::table
        .inner_join(users::table)
        .filter(recipes::id.eq(id))
        .filter(recipes::deleted_at.is_null())
        .select((
            recipes::id,
            recipes::user_id,
            recipes::title,
            recipes::ingredients,
            recipes::steps,
            recipes::preparation_minutes,
            recipes::meal_type,
            recipes::calories,
            recipes::protein,
            recipes::carbs,
            recipes::fat,
            recipes::photo_id,
            recipes::status,
            recipes::created_at,
            recipes::updated_at,
            users::display_name,
            average_rating_sql(),
            sql::<BigInt>(
                "(SELECT COUNT(*) FROM ratings WHERE ratings.recipe_id = recipes.id)",
            ),
        ))
        .first(&mut conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    let status = row.status.parse().unwrap_or(ModerationStatus::Pending);

    // Unapproved recipes exist only for their author and for moderators;
    // everyone else sees the same 404 as for an unknown id
    let is_author = row.user_id == user.id;
    if status != ModerationStatus::Approved && !is_author && user.role() != Role::Admin {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Recipe not found".to_string(),
            }),
        )
            .into_response();
    }

    let (my_rating, is_favorite) = match caller_state(&mut conn, id, user.id) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to fetch caller's rating/favorite: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    let response = RecipeResponse {
        id: row.id,
        title: row.title,
        ingredients: row.ingredients.into_iter().flatten().collect(),
        steps: row.steps.into_iter().flatten().collect(),
        preparation_minutes: row.preparation_minutes,
        meal_type: row.meal_type.and_then(|m| m.parse().ok()),
        calories: row.calories,
        protein: row.protein,
        carbs: row.carbs,
        fat: row.fat,
        photo_id: row.photo_id,
        author_id: row.user_id,
        author_name: row.author_name,
        status,
        average_rating: row.average_rating,
        rating_count: row.rating_count,
        my_rating,
        is_favorite,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// The caller's own rating and favorite membership for one recipe. Absent
/// rows are ordinary (unrated, not favorited); query failures are not.
fn caller_state(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    user_id: Uuid,
) -> QueryResult<(Option<i32>, bool)> {
    let my_rating = ratings::table
        .find((recipe_id, user_id))
        .select(ratings::rating)
        .first(conn)
        .optional()?;

    let is_favorite = favorites::table
        .find((recipe_id, user_id))
        .select(favorites::recipe_id)
        .first::<Uuid>(conn)
        .optional()?
        .is_some();

    Ok((my_rating, is_favorite))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{insert_recipe, insert_user, test_conn};
    use crate::models::NewFavorite;

    #[test]
    fn test_caller_state_reflects_own_rows_only() {
        let Some(mut conn) = test_conn() else { return };
        let viewer = insert_user(&mut conn, "detail_viewer");
        let other = insert_user(&mut conn, "detail_other");
        let recipe = insert_recipe(&mut conn, other, "approved");

        assert_eq!(caller_state(&mut conn, recipe, viewer).unwrap(), (None, false));

        diesel::insert_into(ratings::table)
            .values((
                ratings::recipe_id.eq(recipe),
                ratings::user_id.eq(other),
                ratings::rating.eq(4),
            ))
            .execute(&mut conn)
            .unwrap();
        diesel::insert_into(favorites::table)
            .values(&NewFavorite {
                recipe_id: recipe,
                user_id: viewer,
            })
            .execute(&mut conn)
            .unwrap();

        // The other user's rating is not the viewer's rating
        assert_eq!(caller_state(&mut conn, recipe, viewer).unwrap(), (None, true));
        assert_eq!(caller_state(&mut conn, recipe, other).unwrap(), (Some(4), false));
    }
}
