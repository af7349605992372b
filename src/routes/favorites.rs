use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{auth::AuthSession, AppState};
use crate::{
    error::{AppError, AppResult},
    models::{AddFavoriteRequest, CatalogItem, MovieId},
};

/// Favorites of the caller as catalog items, oldest first
///
/// Favorites whose movie left the catalog after a reload are omitted.
pub async fn list(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let favorites = state.accounts.favorites(&session).await?;
    let snapshot = state.snapshot().await;

    let items: Vec<CatalogItem> = favorites
        .iter()
        .filter_map(|favorite| snapshot.catalog.get(&favorite.movie_id).cloned())
        .collect();

    if items.len() < favorites.len() {
        tracing::debug!(
            user_id = session.user_id,
            missing = favorites.len() - items.len(),
            "Favorites not present in the current catalog"
        );
    }

    Ok(Json(items))
}

pub async fn add(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Json(request): Json<AddFavoriteRequest>,
) -> AppResult<(StatusCode, Json<CatalogItem>)> {
    let item = state
        .snapshot()
        .await
        .catalog
        .get(&request.movie_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", request.movie_id)))?;

    state.accounts.add_favorite(&session, &item.id).await?;
    tracing::info!(user_id = session.user_id, movie_id = %item.id, "Favorite added");

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(movie_id): Path<String>,
) -> AppResult<StatusCode> {
    let movie_id = MovieId(movie_id);
    state.accounts.remove_favorite(&session, &movie_id).await?;
    tracing::info!(user_id = session.user_id, movie_id = %movie_id, "Favorite removed");

    Ok(StatusCode::NO_CONTENT)
}
