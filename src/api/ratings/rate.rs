use crate::api::recipes::{average_rating_sql, recipe_is_approved};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewRating;
use crate::schema::{ratings, recipes};
use crate::validation::validate_rating;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RateRecipeRequest {
    /// Star rating, 1-5
    pub rating: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RateRecipeResponse {
    /// The recipe's aggregate rating after this vote
    pub average_rating: f64,
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}/rating",
    tag = "ratings",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = RateRecipeRequest,
    responses(
        (status = 200, description = "Rating recorded", body = RateRecipeResponse),
        (status = 400, description = "Invalid rating", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn rate_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(recipe_id): Path<Uuid>,
    Json(request): Json<RateRecipeRequest>,
) -> impl IntoResponse {
    if let Err(message) = validate_rating(request.rating) {
        return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
            .into_response();
    }

    let mut conn = get_conn!(pool);

    match recipe_is_approved(&mut conn, recipe_id) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to check recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to save rating".to_string(),
                }),
            )
                .into_response();
        }
    }

    if let Err(e) = upsert_rating(&mut conn, recipe_id, user.id, request.rating) {
        tracing::error!("Failed to save rating: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to save rating".to_string(),
            }),
        )
            .into_response();
    }

    match recipe_average(&mut conn, recipe_id) {
        Ok(average_rating) => {
            (StatusCode::OK, Json(RateRecipeResponse { average_rating })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to read aggregate rating: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to save rating".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Idempotent upsert keyed by (recipe, user): a later vote overwrites the
/// earlier one, never duplicates it.
fn upsert_rating(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    user_id: Uuid,
    rating: i32,
) -> QueryResult<()> {
    diesel::insert_into(ratings::table)
        .values(&NewRating {
            recipe_id,
            user_id,
            rating,
        })
        .on_conflict((ratings::recipe_id, ratings::user_id))
        .do_update()
        .set((
            ratings::rating.eq(rating),
            ratings::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;
    Ok(())
}

fn recipe_average(conn: &mut PgConnection, recipe_id: Uuid) -> QueryResult<f64> {
    recipes::table
        .filter(recipes::id.eq(recipe_id))
        .select(average_rating_sql())
        .first(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{insert_recipe, insert_user, test_conn};

    #[test]
    fn test_second_vote_overwrites_first() {
        let Some(mut conn) = test_conn() else { return };
        let voter = insert_user(&mut conn, "rater");
        let recipe = insert_recipe(&mut conn, voter, "approved");

        upsert_rating(&mut conn, recipe, voter, 2).unwrap();
        upsert_rating(&mut conn, recipe, voter, 5).unwrap();

        let rows: Vec<i32> = ratings::table
            .filter(ratings::recipe_id.eq(recipe))
            .filter(ratings::user_id.eq(voter))
            .select(ratings::rating)
            .load(&mut conn)
            .unwrap();
        assert_eq!(rows, vec![5]);

        assert_eq!(recipe_average(&mut conn, recipe).unwrap(), 5.0);
    }

    #[test]
    fn test_average_spans_voters() {
        let Some(mut conn) = test_conn() else { return };
        let author = insert_user(&mut conn, "rater_author");
        let other = insert_user(&mut conn, "rater_other");
        let recipe = insert_recipe(&mut conn, author, "approved");

        upsert_rating(&mut conn, recipe, author, 2).unwrap();
        upsert_rating(&mut conn, recipe, other, 4).unwrap();

        assert_eq!(recipe_average(&mut conn, recipe).unwrap(), 3.0);
    }
}
