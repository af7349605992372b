//! Content-based movie recommender.
//!
//! Scores every catalog item against a reference item by fusing per-feature
//! TF-IDF cosine similarities (genres, keywords, director, cast, overview) with
//! a release-year proximity bonus, then returns the top K other items.
//!
//! The computation is synchronous, deterministic and holds no shared state:
//! each call fits its own feature spaces unless a [`CatalogIndex`] fitted on
//! the same catalog snapshot is supplied.

use crate::models::{CatalogItem, Feature, RankedResult};
use crate::services::catalog::Catalog;

pub mod normalize;
pub mod ranker;
pub mod similarity;
pub mod vectorizer;

pub use normalize::normalize;
pub use similarity::{FeatureWeights, SimilarityScores};
pub use vectorizer::FeatureSpace;

/// Errors raised by a ranking call
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendError {
    #[error("Movie '{0}' was not found in the catalog")]
    NotFound(String),

    #[error("The catalog is empty")]
    EmptyCatalog,
}

/// Ranks `catalog` against the item titled `reference_title` using the default weights.
///
/// Fails with [`RecommendError::NotFound`] when no item carries that title,
/// including when the catalog is empty.
pub fn recommend(
    reference_title: &str,
    catalog: &[CatalogItem],
    k: usize,
) -> Result<Vec<RankedResult>, RecommendError> {
    Recommender::default().recommend(reference_title, catalog, &Feature::ALL, k)
}

/// Index of the first item titled `title`
pub fn find_reference(catalog: &[CatalogItem], title: &str) -> Result<usize, RecommendError> {
    catalog
        .iter()
        .position(|item| item.title == title)
        .ok_or_else(|| RecommendError::NotFound(title.to_string()))
}

/// Fits one feature space per listed feature over the whole catalog
pub fn fit_spaces(catalog: &[CatalogItem], features: &[Feature]) -> Vec<FeatureSpace> {
    features
        .iter()
        .map(|&feature| FeatureSpace::fit(feature, &normalize::normalize_column(catalog, feature)))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Recommender {
    weights: FeatureWeights,
}

impl Recommender {
    /// Ranks `catalog` against `reference_title`, scoring only `features`.
    ///
    /// Features left out behave as if their column did not exist: they add
    /// nothing and the remaining weights are left as they are.
    pub fn recommend(
        &self,
        reference_title: &str,
        catalog: &[CatalogItem],
        features: &[Feature],
        k: usize,
    ) -> Result<Vec<RankedResult>, RecommendError> {
        let reference_index = find_reference(catalog, reference_title)?;
        let spaces = fit_spaces(catalog, features);
        Ok(self.rank_with(&spaces, catalog, reference_index, k))
    }

    /// Ranks a catalog snapshot, reusing `index` when it was fitted on this very snapshot
    pub fn recommend_in(
        &self,
        catalog: &Catalog,
        index: Option<&CatalogIndex>,
        reference_title: &str,
        k: usize,
    ) -> Result<Vec<RankedResult>, RecommendError> {
        let reference_index = find_reference(catalog.items(), reference_title)?;

        match index {
            Some(index) if index.catalog_version() == catalog.version() => {
                Ok(self.rank_with(index.spaces(), catalog.items(), reference_index, k))
            }
            stale => {
                if let Some(index) = stale {
                    tracing::warn!(
                        index_version = index.catalog_version(),
                        catalog_version = catalog.version(),
                        "Ignoring feature spaces fitted on another catalog version"
                    );
                }
                let spaces = fit_spaces(catalog.items(), catalog.features());
                Ok(self.rank_with(&spaces, catalog.items(), reference_index, k))
            }
        }
    }

    fn rank_with(
        &self,
        spaces: &[FeatureSpace],
        catalog: &[CatalogItem],
        reference_index: usize,
        k: usize,
    ) -> Vec<RankedResult> {
        let reference = &catalog[reference_index];
        let scores = similarity::fuse(spaces, catalog, reference, &self.weights);
        ranker::rank(&scores, catalog, reference_index, k)
    }
}

/// Feature spaces fitted once for a catalog snapshot.
///
/// Only valid for the snapshot whose version it records; anything else falls
/// back to fitting per call.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    catalog_version: String,
    spaces: Vec<FeatureSpace>,
}

impl CatalogIndex {
    pub fn fit(catalog: &Catalog) -> Result<Self, RecommendError> {
        if catalog.is_empty() {
            return Err(RecommendError::EmptyCatalog);
        }

        let spaces = fit_spaces(catalog.items(), catalog.features());
        tracing::info!(
            catalog_version = catalog.version(),
            features = spaces.len(),
            vocabulary = spaces.iter().map(FeatureSpace::vocabulary_len).sum::<usize>(),
            "Feature spaces fitted"
        );

        Ok(Self {
            catalog_version: catalog.version().to_string(),
            spaces,
        })
    }

    pub fn catalog_version(&self) -> &str {
        &self.catalog_version
    }

    pub fn spaces(&self) -> &[FeatureSpace] {
        &self.spaces
    }
}
