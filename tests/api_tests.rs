use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use movie_advisor::{
    api::{create_router, AppState},
    db::{InMemoryRatingStore, InMemorySimilarityStore},
    error::{AppError, AppResult},
    middleware::request_id::REQUEST_ID_HEADER,
    models::{MovieId, SortedSimilarities},
    services::{RecommenderConfig, SimilarityLookup},
};

struct UnreachableStore;

#[async_trait::async_trait]
impl SimilarityLookup for UnreachableStore {
    async fn lookup(&self, _movie_id: MovieId) -> AppResult<Option<SortedSimilarities>> {
        Err(AppError::LookupFailure("connection refused".to_string()))
    }
}

fn ratings() -> InMemoryRatingStore {
    InMemoryRatingStore::new()
        .with_rating(0, 0, 0.0)
        .with_rating(0, 1, 5.0)
        .with_rating(0, 2, 5.0)
}

fn similarities() -> InMemorySimilarityStore {
    InMemorySimilarityStore::new()
        .with_similarities(0, vec![(10, 1.0)])
        .with_similarities(1, vec![(11, 0.5), (12, 0.4)])
        .with_similarities(2, vec![(12, 0.3), (13, 0.1)])
}

fn create_test_app() -> Router {
    let state = AppState::new(
        Arc::new(ratings()),
        Arc::new(similarities()),
        RecommenderConfig::default(),
    );
    create_router(state)
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn recommended_ids(body: &Value) -> Vec<i64> {
    body["value"]["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["movie_id"].as_i64().unwrap())
        .collect()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let response = create_test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    assert_eq!(json_body(response).await, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_user_recommendations() {
    let response = create_test_app()
        .oneshot(
            Request::get("/users/0/recommendations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(recommended_ids(&body), vec![12, 11, 13]);

    let top = body["value"]["recommendations"][0]["weight"].as_f64().unwrap();
    assert!((top - 0.7).abs() < 1e-9);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_user_gets_empty_list() {
    let response = create_test_app()
        .oneshot(
            Request::get("/users/99/recommendations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(recommended_ids(&body).is_empty());
}

#[tokio::test]
async fn test_score_supplied_ratings() {
    let response = create_test_app()
        .oneshot(post_json(
            "/recommendations",
            json!({
                "ratings": [
                    { "movie_id": 1, "rating": 4.0 },
                    { "movie_id": 11, "rating": 5.0 }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(recommended_ids(&body), vec![12]);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let request_id = "0b5c6a52-4a6e-4d1a-9d37-5b7f0f5e2c11";
    let response = create_test_app()
        .oneshot(
            Request::get("/health")
                .header(REQUEST_ID_HEADER, request_id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        request_id
    );
}

#[tokio::test]
async fn test_lookup_failure_is_bad_gateway() {
    let state = AppState::new(
        Arc::new(ratings()),
        Arc::new(UnreachableStore),
        RecommenderConfig::default(),
    );
    let response = create_router(state)
        .oneshot(
            Request::get("/users/0/recommendations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_concurrent_lookups_same_result() {
    let state = AppState::new(
        Arc::new(ratings()),
        Arc::new(similarities()),
        RecommenderConfig::default().with_concurrent_lookups(true),
    );
    let response = create_router(state)
        .oneshot(
            Request::get("/users/0/recommendations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(recommended_ids(&body), vec![12, 11, 13]);
}
