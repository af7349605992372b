use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path of the cleaned catalog CSV
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of recommendations returned when the request does not say
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Largest number of recommendations a request may ask for
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Fit feature spaces once per catalog version instead of per request
    #[serde(default)]
    pub cache_feature_spaces: bool,

    /// PostgreSQL connection URL; accounts stay in memory when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL; response caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// TMDb API key; trailer lookup is disabled when unset
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDb API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDb image CDN base URL
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Lifetime of a login session, in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_catalog_path() -> String {
    "data/df_movie_cleaned.csv".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_k() -> usize {
    5
}

fn default_max_k() -> usize {
    50
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/".to_string()
}

fn default_session_ttl_secs() -> u64 {
    86_400
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            host: default_host(),
            port: default_port(),
            default_k: default_k(),
            max_k: default_max_k(),
            cache_feature_spaces: false,
            database_url: None,
            redis_url: None,
            tmdb_api_key: None,
            tmdb_api_url: default_tmdb_api_url(),
            tmdb_image_url: default_tmdb_image_url(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_k == 0 {
            anyhow::bail!("MAX_K must be at least 1");
        }
        if self.default_k == 0 || self.default_k > self.max_k {
            anyhow::bail!(
                "DEFAULT_K must be between 1 and MAX_K ({}), got {}",
                self.max_k,
                self.default_k
            );
        }
        if self.session_ttl_secs == 0 {
            anyhow::bail!("SESSION_TTL_SECS must be at least 1");
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
