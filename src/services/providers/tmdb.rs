/// TMDb (The Movie Database) metadata provider
///
/// Images are served from a static CDN, so poster URLs are built locally.
/// Trailers need one API call: /movie/{id}/videos → first video of type "Trailer".
/// People are looked up with /search/person → first result.
use reqwest::Client as HttpClient;
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::{AppError, AppResult},
    models::PersonMatch,
    services::providers::MetadataProvider,
};

pub const PLACEHOLDER_POSTER_URL: &str = "https://via.placeholder.com/500x750.png?text=No+Image";

pub const VALID_POSTER_SIZES: [&str; 7] = ["w92", "w154", "w185", "w342", "w500", "w780", "original"];

pub const DEFAULT_POSTER_SIZE: &str = "w500";

/// Builds the URL of a TMDb image
///
/// Missing or empty paths give a placeholder image. Unknown sizes fall back to `w500`.
pub fn poster_url(image_base_url: &str, path: Option<&str>, size: &str) -> String {
    let path = match path.map(str::trim) {
        Some(path) if !path.is_empty() => path.trim_start_matches('/'),
        _ => return PLACEHOLDER_POSTER_URL.to_string(),
    };

    let size = if VALID_POSTER_SIZES.contains(&size) {
        size
    } else {
        DEFAULT_POSTER_SIZE
    };

    format!("{}/{}/{}", image_base_url.trim_end_matches('/'), size, path)
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    results: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    key: String,
    #[serde(rename = "type")]
    video_type: String,
}

fn first_trailer(videos: &VideosResponse) -> Option<String> {
    videos
        .results
        .iter()
        .find(|video| video.video_type == "Trailer")
        .map(|video| format!("https://www.youtube.com/embed/{}", video.key))
}

#[derive(Debug, Deserialize)]
struct PeopleResponse {
    #[serde(default)]
    results: Vec<Person>,
}

#[derive(Debug, Deserialize)]
struct Person {
    id: u64,
    name: String,
    #[serde(default)]
    profile_path: Option<String>,
}

fn first_person(people: PeopleResponse) -> Option<PersonMatch> {
    people.results.into_iter().next().map(|person| PersonMatch {
        tmdb_id: person.id,
        name: person.name,
        profile_path: person.profile_path.filter(|path| !path.trim().is_empty()),
    })
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    /// GET `{api_url}{path}` with the API key and French localization
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> AppResult<T> {
        let url = format!("{}{}", self.api_url.trim_end_matches('/'), path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "fr")])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDb API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn trailer_url(&self, tmdb_id: u64) -> AppResult<Option<String>> {
        let videos: VideosResponse = self
            .get_json(&format!("/movie/{}/videos", tmdb_id), &[])
            .await?;
        let trailer = first_trailer(&videos);

        tracing::debug!(
            tmdb_id,
            videos = videos.results.len(),
            found = trailer.is_some(),
            provider = "tmdb",
            "Trailer lookup completed"
        );

        Ok(trailer)
    }

    async fn find_person(&self, name: &str) -> AppResult<Option<PersonMatch>> {
        let people: PeopleResponse = self
            .get_json("/search/person", &[("query", name)])
            .await?;
        let found = first_person(people);

        tracing::debug!(
            name = %name,
            found = found.is_some(),
            provider = "tmdb",
            "Person lookup completed"
        );

        Ok(found)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
