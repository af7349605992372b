use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::PersonImage,
    services::providers::poster_url,
};

const PROFILE_IMAGE_SIZE: &str = "w500";

#[derive(Debug, Deserialize)]
pub struct PersonQuery {
    name: String,
}

/// Handler for director and actor photos
pub async fn image(
    State(state): State<AppState>,
    Query(params): Query<PersonQuery>,
) -> AppResult<Json<PersonImage>> {
    let name = params.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Name cannot be empty".to_string()));
    }

    let person = state
        .metadata
        .find_person(name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No person named '{}' was found", name)))?;

    let image_url = poster_url(
        &state.config.tmdb_image_url,
        person.profile_path.as_deref(),
        PROFILE_IMAGE_SIZE,
    );

    Ok(Json(PersonImage {
        tmdb_id: person.tmdb_id,
        name: person.name,
        image_url,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::config::Config;
    use crate::error::AppError;
    use crate::models::PersonMatch;
    use crate::routes::test_support::{app, app_with, get};
    use crate::services::providers::{MockMetadataProvider, PLACEHOLDER_POSTER_URL};

    fn person(profile_path: Option<&str>) -> PersonMatch {
        PersonMatch {
            tmdb_id: 10297,
            name: "Michael Mann".to_string(),
            profile_path: profile_path.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_person_image() {
        let mut metadata = MockMetadataProvider::new();
        metadata.expect_find_person().times(1).returning(|name: &str| {
            assert_eq!(name, "Michael Mann");
            Ok(Some(person(Some("/mann.jpg"))))
        });

        let app = app_with(Arc::new(metadata), Config::default());
        let (status, body) = get(&app, "/api/v1/people/image?name=%20Michael%20Mann").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tmdb_id"], 10297);
        assert_eq!(body["image_url"], "https://image.tmdb.org/t/p/w500/mann.jpg");
    }

    #[tokio::test]
    async fn test_person_without_photo_gets_placeholder() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_find_person()
            .returning(|_: &str| Ok(Some(person(None))));

        let app = app_with(Arc::new(metadata), Config::default());
        let (status, body) = get(&app, "/api/v1/people/image?name=Michael%20Mann").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["image_url"], PLACEHOLDER_POSTER_URL);
    }

    #[tokio::test]
    async fn test_unknown_person_is_not_found() {
        let (status, _) = get(&app(), "/api/v1/people/image?name=Nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(&app(), "/api/v1/people/image?name=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_find_person()
            .returning(|_: &str| Err(AppError::ExternalApi("TMDb is down".to_string())));

        let app = app_with(Arc::new(metadata), Config::default());
        let (status, _) = get(&app, "/api/v1/people/image?name=Michael%20Mann").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
