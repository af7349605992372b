use std::io::Write;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use film_recommender::{
    config::Config,
    db::CacheKey,
    routes::{create_router, AppState},
    services::{
        catalog::read_catalog, providers::NoMetadata, AccountService, Catalog,
        InMemoryAccountStore,
    },
};

const CATALOG_CSV: &str = "\
ID,Titre Original,Titre Français,Synopsis,Date de Sortie,Réalisateur(s),Acteurs,Genres,Mots-Clés,Durée,Note imdb,Note tmdb,Votes imdb,Votes tmdb,Popularité,ID tmdb,Affiche
tt0133093,The Matrix,Matrix,A hacker learns the truth about reality,1999-03-31,Lana Wachowski,\"Keanu Reeves (Neo), Laurence Fishburne (Morpheus)\",\"Action, Science Fiction\",\"simulation, hacker\",136,8.7,8.2,2000000,25000,80.5,603,/matrix.jpg
tt0234215,The Matrix Reloaded,Matrix Reloaded,Neo fights to save Zion,2003-05-15,Lana Wachowski,\"Keanu Reeves (Neo), Carrie-Anne Moss (Trinity)\",\"Action, Science Fiction\",\"simulation, prophecy\",138,7.2,7.0,600000,10000,40.1,604,/reloaded.jpg
tt0113277,Heat,Heat,A detective hunts a crew of thieves,1995-12-15,Michael Mann,\"Al Pacino (Hanna), Robert De Niro (McCauley)\",\"Crime, Drama, Action\",\"heist, detective\",170,8.3,7.9,700000,7000,50.0,949,/heat.jpg
tt0211915,Amélie,Le Fabuleux Destin d'Amélie Poulain,A shy waitress changes lives in Paris,2001-04-25,Jean-Pierre Jeunet,Audrey Tautou (Amélie),\"Comedy, Romance\",\"paris, waitress\",122,8.3,7.9,780000,10000,30.2,194,
tt1049413,Up,Là-haut,An old man flies his house to South America,2009-05-28,Pete Docter,Ed Asner (Carl),\"Animation, Comedy, Adventure\",\"balloon, old man\",96,8.3,7.9,1100000,19000,60.7,14160,/up.jpg
";

fn create_test_app() -> Router {
    let catalog = read_catalog(CATALOG_CSV.as_bytes()).unwrap();
    let state = AppState::new(
        catalog,
        AccountService::new(Arc::new(InMemoryAccountStore::new())),
        Arc::new(NoMetadata),
        None,
        Config::default(),
    );
    create_router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn titles(results: &Value) -> Vec<String> {
    results
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_recommendations_for_catalog_movie() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/v1/recommendations?title=The%20Matrix&k=3").await;

    assert_eq!(status, StatusCode::OK);
    let results = &body["results"];
    assert_eq!(results.as_array().unwrap().len(), 3);
    assert_eq!(titles(results)[0], "The Matrix Reloaded");
    assert!(!titles(results).contains(&"The Matrix".to_string()));

    let scores: Vec<f64> = results
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["similarity_score"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[tokio::test]
async fn test_recommendations_are_deterministic() {
    let app = create_test_app();

    let (_, first) = get(&app, "/api/v1/recommendations?title=Heat&k=4").await;
    let (_, second) = get(&app, "/api/v1/recommendations?title=Heat&k=4").await;

    assert_eq!(first["results"], second["results"]);
}

#[tokio::test]
async fn test_recommendations_k_larger_than_catalog() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/v1/recommendations?title=Up&k=50").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_recommendations_unknown_title() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/v1/recommendations?title=Casablanca").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Casablanca"));
}

#[tokio::test]
async fn test_recommendations_by_french_title() {
    let app = create_test_app();

    let (status, body) = get(
        &app,
        "/api/v1/recommendations?title=L%C3%A0-haut&lang=fr&k=1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reference"], "Up");
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[test]
fn test_different_catalogs_never_share_a_cache_key() {
    let key = |catalog: &Catalog| {
        CacheKey::Recommendations {
            catalog_version: catalog.version().to_string(),
            title: "Heat".to_string(),
            k: 1,
        }
        .to_string()
    };

    let original = read_catalog(CATALOG_CSV.as_bytes()).unwrap();
    let reloaded = read_catalog(CATALOG_CSV.as_bytes()).unwrap();
    assert_eq!(key(&original), key(&reloaded));

    let edited_csv = CATALOG_CSV.replace(
        "A detective hunts a crew of thieves",
        "A detective hunts a lone thief",
    );
    let edited = read_catalog(edited_csv.as_bytes()).unwrap();
    assert_ne!(key(&original), key(&edited));

    let trimmed_csv: String = CATALOG_CSV
        .lines()
        .take(4)
        .map(|line| format!("{}\n", line))
        .collect();
    let trimmed = read_catalog(trimmed_csv.as_bytes()).unwrap();
    assert_eq!(trimmed.len(), 3);
    assert_ne!(key(&original), key(&trimmed));
}

#[tokio::test]
async fn test_browse_endpoints() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/v1/movies?q=fabuleux").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Amélie"]);

    let (status, body) = get(&app, "/api/v1/movies/filter?genres=Comedy&max_runtime=100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Up"]);

    let (status, body) = get(&app, "/api/v1/movies/top?sort_by=popularity&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["The Matrix", "Up"]);

    let (status, body) = get(&app, "/api/v1/movies/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["films"], 5);
}

#[tokio::test]
async fn test_movie_details_without_poster() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api/v1/movies/tt0211915").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title_fr"], "Le Fabuleux Destin d'Amélie Poulain");
    assert_eq!(
        body["poster_url"],
        "https://via.placeholder.com/500x750.png?text=No+Image"
    );
    assert_eq!(body["cast"], json!(["Audrey Tautou"]));
}

#[tokio::test]
async fn test_account_and_favorites_flow() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        post_json(
            "/api/v1/accounts/register",
            json!({ "username": "cinephile", "password": "popcorn", "confirm_password": "popcorn" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, session) = send(
        &app,
        post_json(
            "/api/v1/accounts/login",
            json!({ "username": "cinephile", "password": "popcorn" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = session["token"].as_str().unwrap().to_string();

    for movie_id in ["tt0113277", "tt1049413"] {
        let (status, _) = send(
            &app,
            post_json(
                "/api/v1/favorites",
                json!({ "movie_id": movie_id }),
                Some(&token),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Request::get("/api/v1/favorites")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Heat", "Up"]);
}

#[tokio::test]
async fn test_reload_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", CATALOG_CSV).unwrap();

    let config = Config {
        catalog_path: file.path().to_string_lossy().into_owned(),
        cache_feature_spaces: true,
        ..Config::default()
    };
    let state = AppState::new(
        read_catalog("ID,Titre Original\nx,Placeholder\n".as_bytes()).unwrap(),
        AccountService::new(Arc::new(InMemoryAccountStore::new())),
        Arc::new(NoMetadata),
        None,
        config,
    );
    let app = create_router(state);

    let (status, _) = get(&app, "/api/v1/recommendations?title=Heat").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, stats) = send(
        &app,
        Request::post("/api/v1/catalog/reload")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["films"], 5);

    let (status, body) = get(&app, "/api/v1/recommendations?title=Heat&k=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["catalog_version"], stats["catalog_version"]);
}
