use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::Config,
    db::Cache,
    services::{AccountService, Catalog, CatalogIndex, MetadataProvider, Recommender},
};

/// A catalog together with the feature spaces fitted on it, if any.
///
/// Both are swapped as one value so a reload can never pair a new catalog
/// with an index fitted on the old one.
pub struct CatalogSnapshot {
    pub catalog: Catalog,
    pub index: Option<CatalogIndex>,
}

impl CatalogSnapshot {
    /// Wraps `catalog`, fitting its feature spaces up front when `fit_index` is set
    pub fn new(catalog: Catalog, fit_index: bool) -> Self {
        let index = if fit_index {
            CatalogIndex::fit(&catalog).ok()
        } else {
            None
        };

        Self { catalog, index }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<RwLock<Arc<CatalogSnapshot>>>,
    pub recommender: Recommender,
    pub accounts: Arc<AccountService>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub cache: Option<Cache>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        catalog: Catalog,
        accounts: AccountService,
        metadata: Arc<dyn MetadataProvider>,
        cache: Option<Cache>,
        config: Config,
    ) -> Self {
        let snapshot = CatalogSnapshot::new(catalog, config.cache_feature_spaces);

        Self {
            catalog: Arc::new(RwLock::new(Arc::new(snapshot))),
            recommender: Recommender::default(),
            accounts: Arc::new(accounts),
            metadata,
            cache,
            config: Arc::new(config),
        }
    }

    /// The current catalog snapshot; unaffected by later reloads
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.catalog.read().await.clone()
    }

    /// Replaces the catalog and its index in one step
    pub async fn replace_snapshot(&self, snapshot: CatalogSnapshot) {
        *self.catalog.write().await = Arc::new(snapshot);
    }
}
