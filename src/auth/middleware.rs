use crate::db::DbPool;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::db::get_user_from_token;
use super::extractor::{bearer_token, AuthError};

/// Blanket gate for the protected route tree. Handlers behind it still run
/// the [`super::AuthUser`] extractor to get the user row; this layer exists
/// so a route without any extractor cannot be reached anonymously.
pub async fn require_auth(
    State(pool): State<Arc<DbPool>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Ok(t) => t.to_string(),
        Err(rejection) => return rejection.into_response(),
    };

    if get_user_from_token(&pool, &token).await.is_none() {
        return AuthError::InvalidToken.into_response();
    }

    next.run(request).await
}
