use crate::api::recipes::{average_rating_sql, like_pattern};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{MealType, ModerationStatus};
use crate::schema::{recipes, users};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Text};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Number of items to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Free-text filter matched against title and ingredients,
    /// case-insensitive
    pub q: Option<String>,
    /// Restrict to one meal category (breakfast, lunch or dinner)
    pub meal_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMetadata {
    /// Total number of items available
    pub total: i64,
    /// Number of items requested (limit)
    pub limit: i64,
    /// Number of items skipped (offset)
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub preparation_minutes: i32,
    pub meal_type: Option<MealType>,
    pub photo_id: Option<Uuid>,
    pub author_name: String,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub pagination: PaginationMetadata,
}

#[derive(Queryable)]
struct RecipeForList {
    id: Uuid,
    title: String,
    ingredients: Vec<Option<String>>,
    preparation_minutes: i32,
    meal_type: Option<String>,
    photo_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    author_name: String,
    average_rating: f64,
    /// Total count of all matching rows (from window function)
    total_count: i64,
}

/// Normalized listing filters, after parameter validation.
struct ListingFilter {
    limit: i64,
    offset: i64,
    text_pattern: Option<String>,
    meal_type: Option<MealType>,
}

/// The public listing query. Only approved, live recipes are visible here
/// regardless of who asks; pending and rejected submissions do not exist as
/// far as browsing is concerned.
fn load_public_recipes(
    conn: &mut PgConnection,
    filter: &ListingFilter,
) -> QueryResult<Vec<RecipeForList>> {
    let mut query = recipes::table
        .inner_join(users::table)
        .filter(recipes::status.eq(ModerationStatus::Approved.as_str()))
        .filter(recipes::deleted_at.is_null())
        .into_boxed();

    // Free-text search over title and ingredient entries
    if let Some(ref pattern) = filter.text_pattern {
        query = query.filter(
            recipes::title.ilike(pattern.clone()).or(sql::<Bool>(
                "EXISTS (SELECT 1 FROM unnest(recipes.ingredients) AS ing WHERE ing ILIKE ",
            )
            .bind::<Text, _>(pattern.clone())
            .sql(")")),
        );
    }

    if let Some(meal_type) = filter.meal_type {
        query = query.filter(recipes::meal_type.eq(meal_type.as_str()));
    }

    // COUNT(*) OVER() computes the total count across all matching rows
    query
        .order(recipes::created_at.desc())
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
            sql::<BigInt>("COUNT(*) OVER()"),
        ))
        .limit(filter.limit)
        .offset(filter.offset)
        .load(conn)
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Approved recipes, newest first", body = ListRecipesResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    AuthUser(_user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);

    let meal_type = match params.meal_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<MealType>() {
            Ok(m) => Some(m),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "Meal type must be breakfast, lunch or dinner".to_string(),
                    }),
                )
                    .into_response()
            }
        },
    };

    let filter = ListingFilter {
        limit,
        offset,
        text_pattern: params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern),
        meal_type,
    };

    let mut conn = get_conn!(pool);

    let results = match load_public_recipes(&mut conn, &filter) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let total = results.first().map(|r| r.total_count).unwrap_or(0);

    let recipes = results
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

    (
        StatusCode::OK,
        Json(ListRecipesResponse {
            recipes,
            pagination: PaginationMetadata {
                total,
                limit,
                offset,
            },
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{insert_recipe, insert_user, test_conn};

    fn all_recipes() -> ListingFilter {
        ListingFilter {
            limit: 100,
            offset: 0,
            text_pattern: None,
            meal_type: None,
        }
    }

    fn listed_ids(conn: &mut PgConnection) -> Vec<Uuid> {
        load_public_recipes(conn, &all_recipes())
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect()
    }

    // The database named by DATABASE_URL may hold unrelated rows, so these
    // assert membership of the fixtures rather than exact result sets.
    #[test]
    fn test_pending_and_rejected_recipes_hidden_from_listing() {
        let Some(mut conn) = test_conn() else { return };
        let author = insert_user(&mut conn, "listing_author");

        let approved = insert_recipe(&mut conn, author, "approved");
        let pending = insert_recipe(&mut conn, author, "pending");
        let rejected = insert_recipe(&mut conn, author, "rejected");

        let ids = listed_ids(&mut conn);
        assert!(ids.contains(&approved));
        assert!(!ids.contains(&pending));
        assert!(!ids.contains(&rejected));
    }

    #[test]
    fn test_approval_makes_recipe_visible() {
        let Some(mut conn) = test_conn() else { return };
        let author = insert_user(&mut conn, "listing_author_2");
        let recipe = insert_recipe(&mut conn, author, "pending");

        assert!(!listed_ids(&mut conn).contains(&recipe));

        diesel::update(recipes::table.find(recipe))
            .set(recipes::status.eq(ModerationStatus::Approved.as_str()))
            .execute(&mut conn)
            .unwrap();

        assert!(listed_ids(&mut conn).contains(&recipe));
    }
}
