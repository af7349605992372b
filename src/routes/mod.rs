use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod favorites;
pub mod movies;
pub mod people;
pub mod recommendations;
pub mod state;

pub use state::{AppState, CatalogSnapshot};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog browsing
        .route("/movies", get(movies::search))
        .route("/movies/filter", get(movies::filter))
        .route("/movies/top", get(movies::top))
        .route("/movies/stats", get(movies::stats))
        .route("/movies/:id", get(movies::details))
        .route("/people/image", get(people::image))
        // Recommendations
        .route("/recommendations", get(recommendations::recommend))
        .route("/catalog/reload", post(catalog::reload))
        // Accounts
        .route("/accounts/register", post(accounts::register))
        .route("/accounts/login", post(accounts::login))
        .route("/accounts/logout", post(accounts::logout))
        // Favorites
        .route("/favorites", get(favorites::list).post(favorites::add))
        .route("/favorites/:movie_id", delete(favorites::remove))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{create_router, AppState};
    use crate::{
        config::Config,
        models::{CatalogItem, Feature},
        services::{
            providers::NoMetadata, AccountService, Catalog, InMemoryAccountStore,
            MetadataProvider,
        },
    };

    pub fn sample_catalog() -> Catalog {
        let movie = |id: &str, title: &str, genres: [&str; 2], year: i32, tmdb_id: u64| {
            let mut item = CatalogItem::new(id, title)
                .with_feature(Feature::Genres, genres)
                .with_release_year(year);
            item.tmdb_id = Some(tmdb_id);
            item.poster_path = Some(format!("/{}.jpg", id));
            item
        };

        let mut matrix = movie("tt0133093", "The Matrix", ["Action", "Science Fiction"], 1999, 603);
        matrix.title_fr = Some("Matrice".to_string());

        Catalog::new(vec![
            matrix,
            movie("tt0234215", "The Matrix Reloaded", ["Action", "Science Fiction"], 2003, 604),
            movie("tt0113277", "Heat", ["Crime", "Drama"], 1995, 949),
            movie("tt0211915", "Amélie", ["Comedy", "Romance"], 2001, 194),
        ])
    }

    pub fn app_with(metadata: Arc<dyn MetadataProvider>, config: Config) -> Router {
        let state = AppState::new(
            sample_catalog(),
            AccountService::new(Arc::new(InMemoryAccountStore::new()))
                .with_session_ttl(config.session_ttl()),
            metadata,
            None,
            config,
        );
        create_router(state)
    }

    pub fn app() -> Router {
        app_with(Arc::new(NoMetadata), Config::default())
    }

    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }
}
