use crate::api::ErrorResponse;
use crate::assistant::{Assistant, AssistantError, ChatMessage};
use crate::auth::AuthUser;
use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Transcripts longer than this are rejected rather than truncated, so the
/// client notices instead of silently losing context.
const MAX_TRANSCRIPT_MESSAGES: usize = 50;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The full visible transcript, oldest first
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}

#[utoipa::path(
    post,
    path = "/api/assistant/chat",
    tag = "assistant",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 402, description = "Assistant quota exhausted", body = ErrorResponse),
        (status = 429, description = "Assistant rate limited", body = ErrorResponse),
        (status = 502, description = "Assistant unavailable", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn chat(
    AuthUser(_user): AuthUser,
    Extension(assistant): Extension<Arc<dyn Assistant>>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    if request.messages.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Transcript cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    if request.messages.len() > MAX_TRANSCRIPT_MESSAGES {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Transcript too long".to_string(),
            }),
        )
            .into_response();
    }

    match assistant.chat(&request.messages).await {
        Ok(response) => (StatusCode::OK, Json(ChatResponse { response })).into_response(),
        Err(AssistantError::RateLimited { retry_after_secs }) => {
            tracing::warn!(?retry_after_secs, "assistant rate limited");
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse {
                    error: "Rate limit exceeded. Please try again later.".to_string(),
                }),
            )
                .into_response()
        }
        Err(AssistantError::QuotaExceeded(message)) => {
            tracing::warn!(%message, "assistant quota exhausted");
            (
                StatusCode::PAYMENT_REQUIRED,
                Json(ErrorResponse {
                    error: "Assistant temporarily unavailable. Please try again later."
                        .to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Assistant call failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Failed to get response from assistant".to_string(),
                }),
            )
                .into_response()
        }
    }
}
