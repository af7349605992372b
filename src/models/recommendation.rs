use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CatalogItem, Feature};

/// Weighted contributions that add up to a result's similarity score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Per-feature cosine similarity, already multiplied by the feature weight
    pub features: BTreeMap<Feature, f64>,
    /// Release-year proximity bonus, already multiplied by its weight
    pub release_year: f64,
}

/// A catalog item ranked against a reference item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub similarity_score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Response body for a recommendation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub reference: String,
    pub catalog_version: String,
    pub results: Vec<RankedResult>,
}
