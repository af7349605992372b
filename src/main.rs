use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use film_recommender::{
    config::Config,
    db::{create_pool, create_redis_client, run_migrations, Cache, PgAccountStore},
    routes::{create_router, AppState},
    services::{
        accounts::AccountStore,
        catalog::load_catalog,
        providers::{NoMetadata, TmdbProvider},
        AccountService, InMemoryAccountStore, MetadataProvider,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("film_recommender=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let catalog = load_catalog(&config.catalog_path)?;

    let store: Arc<dyn AccountStore> = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url).await?;
            run_migrations(&pool).await?;
            Arc::new(PgAccountStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory");
            Arc::new(InMemoryAccountStore::new())
        }
    };
    tracing::info!(store = store.name(), "Account store ready");

    let (cache, cache_writer) = match &config.redis_url {
        Some(redis_url) => {
            let (cache, handle) = Cache::new(create_redis_client(redis_url)?);
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let metadata: Arc<dyn MetadataProvider> = match &config.tmdb_api_key {
        Some(api_key) => Arc::new(TmdbProvider::new(
            api_key.clone(),
            config.tmdb_api_url.clone(),
        )),
        None => Arc::new(NoMetadata),
    };

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        movies = catalog.len(),
        cache = cache.is_some(),
        metadata = metadata.name(),
        feature_space_cache = config.cache_feature_spaces,
        "Starting server"
    );

    let state = AppState::new(
        catalog,
        AccountService::new(store).with_session_ttl(config.session_ttl()),
        metadata,
        cache,
        config,
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
