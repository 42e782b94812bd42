use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{ModerationStatus, NewRecipe};
use crate::schema::recipes;
use crate::validation::{validate_recipe, RecipeInput};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub preparation_minutes: i32,
    pub meal_type: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    /// Previously uploaded photo to attach; must belong to the submitter
    pub photo_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRecipeResponse {
    pub id: Uuid,
    pub status: ModerationStatus,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe submitted for review", body = CreateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRecipeRequest>,
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

    // A dangling or foreign photo reference fails the whole submission;
    // no recipe record is created.
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
                        error: "Failed to create recipe".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    let ingredients: Vec<Option<String>> = valid.ingredients.into_iter().map(Some).collect();
    let steps: Vec<Option<String>> = valid.steps.into_iter().map(Some).collect();

    // Every submission enters the review queue; authors cannot self-approve
    let new_recipe = NewRecipe {
        user_id: user.id,
        title: &valid.title,
        ingredients: &ingredients,
        steps: &steps,
        preparation_minutes: valid.preparation_minutes,
        meal_type: valid.meal_type.map(|m| m.as_str()),
        calories: valid.calories,
        protein: valid.protein,
        carbs: valid.carbs,
        fat: valid.fat,
        photo_id: request.photo_id,
        status: ModerationStatus::Pending.as_str(),
    };

    let recipe_id: Uuid = match diesel::insert_into(recipes::table)
        .values(&new_recipe)
        .returning(recipes::id)
        .get_result(&mut conn)
    {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::CREATED,
        Json(CreateRecipeResponse {
            id: recipe_id,
            status: ModerationStatus::Pending,
        }),
    )
        .into_response()
}
