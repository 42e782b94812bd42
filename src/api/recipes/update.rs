use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::recipes;
use crate::validation::{validate_recipe, RecipeInput};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Full replacement of the editable fields. Editing does not touch the
/// moderation status: an approved recipe stays approved.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub preparation_minutes: i32,
    pub meal_type: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub photo_id: Option<Uuid>,
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecipeRequest>,
) -> impl IntoResponse {
    let valid = match validate_recipe(RecipeInput {
        title: request.title,
        ingredients: request.ingredients,
        steps: request.steps,
        preparation_minutes: request.preparation_minutes,
        meal_type: request.meal_type,
        calories: request.calories,
        protein: request.protein,
        carbs: request.carbs,
        fat: request.fat,
    }) {
        Ok(v) => v,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
                .into_response()
        }
    };

    let mut conn = get_conn!(pool);

    let author_id: Uuid = match recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::deleted_at.is_null())
        .select(recipes::user_id)
        .first(&mut conn)
    {
        Ok(a) => a,
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

    if author_id != user.id {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only the author can edit this recipe".to_string(),
            }),
        )
            .into_response();
    }

    if let Some(photo_id) = request.photo_id {
        match super::photo_owned_by(&mut conn, photo_id, user.id) {
            Ok(true) => {}
            Ok(false) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "Unknown photo".to_string(),
                    }),
                )
                    .into_response()
            }
            Err(e) => {
                tracing::error!("Failed to check photo ownership: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to update recipe".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    let ingredients: Vec<Option<String>> = valid.ingredients.into_iter().map(Some).collect();
    let steps: Vec<Option<String>> = valid.steps.into_iter().map(Some).collect();

    let result = diesel::update(recipes::table.find(id))
        .set((
            recipes::title.eq(&valid.title),
            recipes::ingredients.eq(&ingredients),
            recipes::steps.eq(&steps),
            recipes::preparation_minutes.eq(valid.preparation_minutes),
            recipes::meal_type.eq(valid.meal_type.map(|m| m.as_str())),
            recipes::calories.eq(valid.calories),
            recipes::protein.eq(valid.protein),
            recipes::carbs.eq(valid.carbs),
            recipes::fat.eq(valid.fat),
            recipes::photo_id.eq(request.photo_id),
            recipes::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn);

    match result {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::error!("Failed to update recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
