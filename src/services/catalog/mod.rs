//! In-memory catalog snapshots.
//!
//! A [`Catalog`] never changes after construction. Its version is a digest of
//! its contents, so two processes loading the same table agree on it and any
//! change to the table yields a new one. Shared cache keys are derived from it.

use sha2::{Digest, Sha256};

use crate::models::{CatalogItem, Feature, MovieId};

mod browse;
mod loader;

pub use browse::{DEFAULT_TOP_LIMIT, MAX_TOP_LIMIT};
pub use loader::{decade_for_year, load_catalog, parse_release_date, read_catalog, CatalogError};

/// Hex digits of the content digest kept as the version
const VERSION_LEN: usize = 16;

/// Immutable snapshot of the movie catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    /// Ranking features present as columns, in scoring order
    features: Vec<Feature>,
    version: String,
}

impl Catalog {
    /// Snapshot whose schema includes every ranking feature
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self::with_features(items, &Feature::ALL)
    }

    /// Snapshot restricted to the given ranking features
    pub fn with_features(items: Vec<CatalogItem>, features: &[Feature]) -> Self {
        let features = Feature::ALL
            .iter()
            .copied()
            .filter(|feature| features.contains(feature))
            .collect::<Vec<_>>();
        let version = content_version(&features, &items);

        Self {
            items,
            features,
            version,
        }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Content digest identifying this snapshot
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &MovieId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// First item whose original title matches exactly
    pub fn find_by_title(&self, title: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.title == title)
    }

    /// First item whose French title matches exactly
    pub fn find_by_french_title(&self, title: &str) -> Option<&CatalogItem> {
        self.items
            .iter()
            .find(|item| item.title_fr.as_deref() == Some(title))
    }
}

/// Truncated SHA-256 of the scored features and every item
fn content_version(features: &[Feature], items: &[CatalogItem]) -> String {
    let mut hasher = Sha256::new();
    if let Err(e) = serde_json::to_writer(&mut hasher, &(features, items)) {
        tracing::warn!(error = %e, "Catalog digest failed, using a random version");
        return uuid::Uuid::new_v4().simple().to_string()[..VERSION_LEN].to_string();
    }

    let mut version = format!("{:x}", hasher.finalize());
    version.truncate(VERSION_LEN);
    version
}
