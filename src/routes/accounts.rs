use axum::{extract::State, http::StatusCode, Json};

use super::{auth::AuthSession, AppState};
use crate::{
    error::AppResult,
    models::{LoginRequest, RegisterRequest, Session, User},
};

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.accounts.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Returns a session whose token authenticates later requests
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<Session>> {
    Ok(Json(state.accounts.login(request).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> StatusCode {
    state.accounts.logout(&session.token).await;
    tracing::info!(user_id = session.user_id, "User logged out");
    StatusCode::NO_CONTENT
}
