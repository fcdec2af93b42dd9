use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{MovieRating, MovieRecommendations, TimestampedValue},
    services::recommendations,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub ratings: Vec<MovieRating>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recommendations for a user whose ratings live in the rating source
pub async fn user_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<TimestampedValue<MovieRecommendations>>> {
    tracing::info!(request_id = %request_id, user_id, "Processing recommendation request");

    let scored = recommendations::recommend_for_user(
        state.ratings.as_ref(),
        state.similarities.as_ref(),
        &state.recommender,
        user_id,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        user_id,
        returned = scored.value.len(),
        "Recommendations computed"
    );

    Ok(Json(scored))
}

/// Recommendations for a rating history supplied by the caller
pub async fn score(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ScoreRequest>,
) -> AppResult<Json<TimestampedValue<MovieRecommendations>>> {
    tracing::info!(
        request_id = %request_id,
        rating_count = request.ratings.len(),
        "Processing score request"
    );

    let scored = recommendations::score_ratings(
        &request.ratings,
        state.similarities.as_ref(),
        &state.recommender,
        None,
    )
    .await?;

    Ok(Json(scored))
}
