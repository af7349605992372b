use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::{AppState, CatalogSnapshot};
use crate::{
    cached,
    db::{redis::RECOMMENDATION_TTL, Cache, CacheKey},
    error::{AppError, AppResult},
    models::RecommendationResponse,
    services::{RecommendError, Recommender},
};

/// Which title column the `title` parameter refers to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleLanguage {
    #[default]
    Original,
    Fr,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
    pub k: Option<usize>,
    #[serde(default)]
    pub lang: TitleLanguage,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let title = params.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }

    let k = params.k.unwrap_or(state.config.default_k);
    if k == 0 || k > state.config.max_k {
        return Err(AppError::InvalidInput(format!(
            "k must be between 1 and {}",
            state.config.max_k
        )));
    }

    // Key and computation must see the same catalog even if a reload lands in between
    let snapshot = state.snapshot().await;
    let reference = resolve_reference(&snapshot, &title, params.lang)?;

    let response = match &state.cache {
        Some(cache) => {
            match cached_recommendations(cache, &state.recommender, &snapshot, &reference, k).await
            {
                Err(AppError::Cache(e)) => {
                    tracing::warn!(error = %e, "Recommendation cache unavailable, computing directly");
                    compute_recommendations(&state.recommender, snapshot, &reference, k).await?
                }
                other => other?,
            }
        }
        None => compute_recommendations(&state.recommender, snapshot, &reference, k).await?,
    };

    tracing::info!(
        title = %reference,
        lang = ?params.lang,
        k,
        results = response.results.len(),
        catalog_version = %response.catalog_version,
        "Recommendations computed"
    );

    Ok(Json(response))
}

/// Original title of the reference movie
fn resolve_reference(
    snapshot: &CatalogSnapshot,
    title: &str,
    lang: TitleLanguage,
) -> AppResult<String> {
    let found = match lang {
        TitleLanguage::Original => snapshot.catalog.find_by_title(title),
        TitleLanguage::Fr => snapshot.catalog.find_by_french_title(title),
    };

    found
        .map(|item| item.title.clone())
        .ok_or_else(|| RecommendError::NotFound(title.to_string()).into())
}

async fn cached_recommendations(
    cache: &Cache,
    recommender: &Recommender,
    snapshot: &Arc<CatalogSnapshot>,
    title: &str,
    k: usize,
) -> AppResult<RecommendationResponse> {
    let key = CacheKey::Recommendations {
        catalog_version: snapshot.catalog.version().to_string(),
        title: title.to_string(),
        k,
    };

    cached!(cache, key, RECOMMENDATION_TTL, async move {
        compute_recommendations(recommender, Arc::clone(snapshot), title, k).await
    })
}

/// Ranks one catalog snapshot on the blocking pool
async fn compute_recommendations(
    recommender: &Recommender,
    snapshot: Arc<CatalogSnapshot>,
    title: &str,
    k: usize,
) -> AppResult<RecommendationResponse> {
    let catalog_version = snapshot.catalog.version().to_string();
    let recommender = recommender.clone();
    let reference = title.to_string();

    let results = tokio::task::spawn_blocking(move || {
        recommender.recommend_in(&snapshot.catalog, snapshot.index.as_ref(), &reference, k)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Recommendation task failed: {}", e)))??;

    Ok(RecommendationResponse {
        reference: title.to_string(),
        catalog_version,
        results,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use std::sync::Arc;

    use super::{compute_recommendations, resolve_reference, TitleLanguage};
    use crate::config::Config;
    use crate::models::CatalogItem;
    use crate::routes::test_support::{app, app_with, get, sample_catalog};
    use crate::routes::{AppState, CatalogSnapshot};
    use crate::services::providers::NoMetadata;
    use crate::services::{AccountService, Catalog, InMemoryAccountStore, Recommender};

    #[tokio::test]
    async fn test_recommend_returns_ranked_results() {
        let (status, body) = get(&app(), "/api/v1/recommendations?title=The%20Matrix&k=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reference"], "The Matrix");

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["title"], "The Matrix Reloaded");
        assert!(results.iter().all(|r| r["title"] != "The Matrix"));
        assert!(results[0]["similarity_score"].as_f64().unwrap() > 0.4);
        assert!(results[0]["breakdown"]["features"]["genres"].as_f64().unwrap() > 0.39);
    }

    #[tokio::test]
    async fn test_recommend_uses_default_k() {
        let config = Config {
            default_k: 1,
            ..Config::default()
        };
        let app = app_with(Arc::new(NoMetadata), config);

        let (status, body) = get(&app, "/api/v1/recommendations?title=Heat").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recommend_with_fitted_index() {
        let config = Config {
            cache_feature_spaces: true,
            ..Config::default()
        };
        let indexed = app_with(Arc::new(NoMetadata), config);

        let (_, with_index) = get(&indexed, "/api/v1/recommendations?title=Heat&k=3").await;
        let (_, without_index) = get(&app(), "/api/v1/recommendations?title=Heat&k=3").await;

        assert_eq!(with_index["results"], without_index["results"]);
    }

    #[tokio::test]
    async fn test_recommend_unknown_title() {
        let (status, body) = get(&app(), "/api/v1/recommendations?title=Nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Movie 'Nope' was not found in the catalog");
    }

    #[tokio::test]
    async fn test_recommend_by_french_title() {
        let (status, body) = get(&app(), "/api/v1/recommendations?title=Matrice&lang=fr&k=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reference"], "The Matrix");
        assert_eq!(body["results"][0]["title"], "The Matrix Reloaded");

        let (status, _) = get(&app(), "/api/v1/recommendations?title=The%20Matrix&lang=fr").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ranking_stays_on_the_snapshot_it_was_keyed_with() {
        let state = AppState::new(
            sample_catalog(),
            AccountService::new(Arc::new(InMemoryAccountStore::new())),
            Arc::new(NoMetadata),
            None,
            Config::default(),
        );
        let snapshot = state.snapshot().await;
        let reference = resolve_reference(&snapshot, "Matrice", TitleLanguage::Fr).unwrap();

        let reloaded = Catalog::new(vec![
            CatalogItem::new("tt0133093", "The Matrix"),
            CatalogItem::new("tt1049413", "Up"),
        ]);
        state.replace_snapshot(CatalogSnapshot::new(reloaded, false)).await;

        let response = compute_recommendations(&Recommender::default(), snapshot.clone(), &reference, 3)
            .await
            .unwrap();

        assert_eq!(response.catalog_version, snapshot.catalog.version());
        assert_ne!(response.catalog_version, state.snapshot().await.catalog.version());
        assert_eq!(response.results.len(), 3);
        assert_eq!(response.results[0].item.title, "The Matrix Reloaded");
    }

    #[tokio::test]
    async fn test_recommend_rejects_unknown_lang() {
        let (status, _) = get(&app(), "/api/v1/recommendations?title=Heat&lang=de").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recommend_rejects_bad_k() {
        let (status, _) = get(&app(), "/api/v1/recommendations?title=Heat&k=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&app(), "/api/v1/recommendations?title=Heat&k=51").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&app(), "/api/v1/recommendations?title=Heat&k=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
