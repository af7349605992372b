/// Movie metadata provider abstraction
///
/// Catalog items carry TMDb identifiers and poster paths. Providers resolve
/// those into displayable assets such as trailer links and cast photos.
use crate::{error::AppResult, models::PersonMatch};

pub mod tmdb;

pub use tmdb::{poster_url, TmdbProvider, PLACEHOLDER_POSTER_URL};

/// Trait for external movie metadata sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Embeddable trailer URL for a TMDb movie id, `None` when the movie has no trailer
    async fn trailer_url(&self, tmdb_id: u64) -> AppResult<Option<String>>;

    /// Best match for a director or actor name, `None` when nobody matches
    async fn find_person(&self, name: &str) -> AppResult<Option<PersonMatch>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Provider used when no metadata API is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

#[async_trait::async_trait]
impl MetadataProvider for NoMetadata {
    async fn trailer_url(&self, _tmdb_id: u64) -> AppResult<Option<String>> {
        Ok(None)
    }

    async fn find_person(&self, _name: &str) -> AppResult<Option<PersonMatch>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
