use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, CatalogStats, MovieDetails, MovieFilter, MovieId, SortBy},
    services::{catalog::DEFAULT_TOP_LIMIT, providers::poster_url},
};

const DETAIL_POSTER_SIZE: &str = "w500";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// Query string of the filter endpoint; `genres` is comma-separated
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    genres: Option<String>,
    min_rating: Option<f64>,
    decade: Option<String>,
    max_runtime: Option<u32>,
}

impl From<FilterQuery> for MovieFilter {
    fn from(query: FilterQuery) -> Self {
        let genres = query
            .genres
            .as_deref()
            .map(|genres| {
                genres
                    .split(',')
                    .map(str::trim)
                    .filter(|genre| !genre.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        MovieFilter {
            genres,
            min_rating: query.min_rating,
            decade: query.decade.filter(|decade| !decade.trim().is_empty()),
            max_runtime: query.max_runtime,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    #[serde(default)]
    sort_by: SortBy,
    limit: Option<usize>,
}

/// Handler for title search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    if params.q.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let snapshot = state.snapshot().await;
    let items: Vec<CatalogItem> = snapshot
        .catalog
        .search(&params.q)
        .into_iter()
        .cloned()
        .collect();

    tracing::info!(query = %params.q, results = items.len(), "Title search completed");
    Ok(Json(items))
}

pub async fn filter(
    State(state): State<AppState>,
    Query(params): Query<FilterQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let filter = MovieFilter::from(params);
    let snapshot = state.snapshot().await;
    let items = snapshot
        .catalog
        .filter(&filter)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(items))
}

pub async fn top(
    State(state): State<AppState>,
    Query(params): Query<TopQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    let snapshot = state.snapshot().await;
    let items = snapshot
        .catalog
        .top(params.sort_by, limit)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(items))
}

pub async fn stats(State(state): State<AppState>) -> Json<CatalogStats> {
    Json(state.snapshot().await.catalog.stats())
}

/// Handler for movie details, enriched with poster and trailer URLs
///
/// A failing trailer lookup is logged and the details are returned without it.
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MovieDetails>> {
    let id = MovieId(id);
    let item = state
        .snapshot()
        .await
        .catalog
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))?;

    let trailer_url = match item.tmdb_id {
        Some(tmdb_id) => match state.metadata.trailer_url(tmdb_id).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    tmdb_id,
                    provider = state.metadata.name(),
                    "Trailer lookup failed"
                );
                None
            }
        },
        None => None,
    };

    let poster_url = poster_url(
        &state.config.tmdb_image_url,
        item.poster_path.as_deref(),
        DETAIL_POSTER_SIZE,
    );

    Ok(Json(MovieDetails {
        item,
        poster_url,
        trailer_url,
    }))
}
