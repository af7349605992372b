use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::Session,
};

/// Session of the caller, resolved from an `Authorization: Bearer <token>` header
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

/// Extracts the session token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> AppResult<Uuid> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .and_then(|token| Uuid::parse_str(token.trim()).ok())
        .ok_or_else(|| AppError::Unauthorized("Malformed bearer token".to_string()))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> AppResult<Self> {
        let token = bearer_token(&parts.headers)?;
        let session = state.accounts.authenticate(&token).await?;
        Ok(AuthSession(session))
    }
}
