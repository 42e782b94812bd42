use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewPhoto;
use crate::photos::processing::{prepare_photo, MAX_FILE_SIZE};
use crate::schema::photos;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
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
pub struct UploadPhotoResponse {
    pub id: Uuid,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadPhotoRequest {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Read the first multipart field as the uploaded file. Axum surfaces its
/// own body-size limit as PAYLOAD_TOO_LARGE; everything else malformed
/// about the body is the client's fault.
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, (StatusCode, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), multipart_error_message(&e)))?
        .ok_or((StatusCode::BAD_REQUEST, "No file provided".to_string()))?;

    field
        .bytes()
        .await
        .map_err(|e| (e.status(), multipart_error_message(&e)))
}

fn multipart_error_message(error: &axum::extract::multipart::MultipartError) -> String {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        format!("File too large. Maximum size is {} bytes", MAX_FILE_SIZE)
    } else {
        format!("Failed to read upload: {}", error.body_text())
    }
}

#[utoipa::path(
    post,
    path = "/api/photos",
    tag = "photos",
    request_body(content_type = "multipart/form-data", content = UploadPhotoRequest),
    responses(
        (status = 201, description = "Photo uploaded successfully", body = UploadPhotoResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let data = match read_upload(multipart).await {
        Ok(data) => data,
        Err((status, error)) => {
            tracing::warn!(%error, "rejected photo upload");
            return (status, Json(ErrorResponse { error })).into_response();
        }
    };

    let processed = match prepare_photo(&data) {
        Ok(p) => p,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    let mut conn = get_conn!(pool);

    let new_photo = NewPhoto {
        user_id: user.id,
        content_type: processed.content_type,
        data: &data,
        thumbnail: &processed.thumbnail,
    };

    match diesel::insert_into(photos::table)
        .values(&new_photo)
        .returning(photos::id)
        .get_result::<Uuid>(&mut conn)
    {
        Ok(id) => (StatusCode::CREATED, Json(UploadPhotoResponse { id })).into_response(),
        Err(e) => {
            tracing::error!("Failed to store photo: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to store photo".to_string(),
                }),
            )
                .into_response()
        }
    }
}
