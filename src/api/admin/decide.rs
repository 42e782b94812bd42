use crate::api::ErrorResponse;
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::ModerationStatus;
use crate::schema::recipes;
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

/// The two moderation outcomes. Deserializing rules out writing `pending`
/// back through this endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    fn as_status(self) -> ModerationStatus {
        match self {
            Decision::Approved => ModerationStatus::Approved,
            Decision::Rejected => ModerationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DecideRecipeRequest {
    pub decision: Decision,
}

#[utoipa::path(
    post,
    path = "/api/admin/recipes/{id}/decision",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = DecideRecipeRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrator access required", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn decide_recipe(
    AdminUser(admin): AdminUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<DecideRecipeRequest>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let status = request.decision.as_status();

    // Direct field update, no optimistic concurrency: two moderators racing
    // on the same recipe settle on whichever write lands last
    let updated = match diesel::update(
        recipes::table
            .filter(recipes::id.eq(id))
            .filter(recipes::deleted_at.is_null()),
    )
    .set((
        recipes::status.eq(status.as_str()),
        recipes::updated_at.eq(diesel::dsl::now),
    ))
    .execute(&mut conn)
    {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to moderate recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to moderate recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    if updated == 0 {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Recipe not found".to_string(),
            }),
        )
            .into_response();
    }

    tracing::info!(
        recipe_id = %id,
        decision = %status,
        admin_id = %admin.id,
        "recipe moderated"
    );

    StatusCode::OK.into_response()
}
