use crate::api::ErrorResponse;
use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ModerationStatsResponse {
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
    pub rejected: i64,
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Recipe counts by moderation status", body = ModerationStatsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Administrator access required", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn moderation_stats(
    AdminUser(_admin): AdminUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let counts: Vec<(String, i64)> = match recipes::table
        .filter(recipes::deleted_at.is_null())
        .group_by(recipes::status)
        .select((recipes::status, diesel::dsl::count_star()))
        .load(&mut conn)
    {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to fetch moderation stats: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch stats".to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut stats = ModerationStatsResponse::default();
    for (status, count) in counts {
        stats.total += count;
        match status.as_str() {
            "approved" => stats.approved = count,
            "pending" => stats.pending = count,
            "rejected" => stats.rejected = count,
            other => tracing::warn!("Recipe with unexpected status {:?} in stats", other),
        }
    }

    (StatusCode::OK, Json(stats)).into_response()
}
