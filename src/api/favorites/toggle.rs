use crate::api::recipes::recipe_is_approved;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewFavorite;
use crate::schema::favorites;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToggleFavoriteResponse {
    /// Membership after the toggle
    pub favorited: bool,
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    tag = "favorites",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Favorite toggled", body = ToggleFavoriteResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn toggle_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(recipe_id): Path<Uuid>,
) -> impl IntoResponse {
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
                    error: "Failed to toggle favorite".to_string(),
                }),
            )
                .into_response();
        }
    }

    match toggle_membership(&mut conn, recipe_id, user.id) {
        Ok(favorited) => {
            (StatusCode::OK, Json(ToggleFavoriteResponse { favorited })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to toggle favorite: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to toggle favorite".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Flip the membership row for (recipe, user) and report the state it ended
/// up in. Delete-else-insert: each statement is atomic on the composite key,
/// so concurrent toggles settle on a definite membership instead of racing a
/// read-then-write window.
fn toggle_membership(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    user_id: Uuid,
) -> QueryResult<bool> {
    let deleted =
        diesel::delete(favorites::table.find((recipe_id, user_id))).execute(conn)?;
    if deleted > 0 {
        return Ok(false);
    }

    diesel::insert_into(favorites::table)
        .values(&NewFavorite { recipe_id, user_id })
        .on_conflict_do_nothing()
        .execute(conn)?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{insert_recipe, insert_user, test_conn};

    fn membership(conn: &mut PgConnection, recipe_id: Uuid, user_id: Uuid) -> i64 {
        favorites::table
            .find((recipe_id, user_id))
            .count()
            .get_result(conn)
            .unwrap()
    }

    #[test]
    fn test_double_toggle_restores_original_state() {
        let Some(mut conn) = test_conn() else { return };
        let user = insert_user(&mut conn, "toggler");
        let recipe = insert_recipe(&mut conn, user, "approved");

        assert_eq!(membership(&mut conn, recipe, user), 0);

        assert!(toggle_membership(&mut conn, recipe, user).unwrap());
        assert_eq!(membership(&mut conn, recipe, user), 1);

        assert!(!toggle_membership(&mut conn, recipe, user).unwrap());
        assert_eq!(membership(&mut conn, recipe, user), 0);
    }
}
