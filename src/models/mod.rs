use serde::{Deserialize, Serialize};

mod account;
mod movie;
mod recommendation;

pub use account::{
    AddFavoriteRequest, Favorite, LoginRequest, RegisterRequest, Session, User, UserRecord,
};
pub use movie::{CatalogItem, Feature, FeatureValue, MovieId};
pub use recommendation::{RankedResult, RecommendationResponse, ScoreBreakdown};

// ============================================================================
// Browse API Types
// ============================================================================

/// Criteria for narrowing the catalog; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieFilter {
    /// Keep movies having at least one of these genres
    #[serde(default)]
    pub genres: Vec<String>,
    /// Minimum mean of the IMDb and TMDb ratings
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub decade: Option<String>,
    /// Maximum runtime in minutes
    #[serde(default)]
    pub max_runtime: Option<u32>,
}

/// Orderings offered by the top-movies listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Popularity,
    ImdbRating,
    TmdbRating,
    AverageRating,
    BoxOffice,
    ReleaseYear,
}

/// Headline numbers about the loaded catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub films: usize,
    pub genres: usize,
    pub votes: u64,
    pub catalog_version: String,
}

/// A catalog item enriched for display
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub poster_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
}

/// First person a metadata provider returned for a name search
#[derive(Debug, Clone, PartialEq)]
pub struct PersonMatch {
    pub tmdb_id: u64,
    pub name: String,
    pub profile_path: Option<String>,
}

/// Profile picture of a director or actor
#[derive(Debug, Clone, Serialize)]
pub struct PersonImage {
    pub tmdb_id: u64,
    pub name: String,
    pub image_url: String,
}
