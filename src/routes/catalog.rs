use axum::{extract::State, Json};

use super::{AppState, CatalogSnapshot};
use crate::{
    error::{AppError, AppResult},
    models::CatalogStats,
    services::catalog::load_catalog,
};

/// Reloads the catalog from the configured CSV and swaps it in
///
/// The current catalog stays in place when loading fails.
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<CatalogStats>> {
    let path = state.config.catalog_path.clone();
    let fit_index = state.config.cache_feature_spaces;

    let snapshot = tokio::task::spawn_blocking(move || -> AppResult<CatalogSnapshot> {
        let catalog = load_catalog(&path)?;
        Ok(CatalogSnapshot::new(catalog, fit_index))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Catalog reload task failed: {}", e)))??;

    let stats = snapshot.catalog.stats();
    state.replace_snapshot(snapshot).await;

    tracing::info!(
        films = stats.films,
        catalog_version = %stats.catalog_version,
        path = %state.config.catalog_path,
        "Catalog reloaded"
    );

    Ok(Json(stats))
}
