use crate::{
    error::AppResult,
    models::{MovieRating, MovieRecommendations, TimestampedValue},
    services::recommender::{self, EventSink, RecommenderConfig, SimilarityLookup},
};

/// Source of a user's rating history
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingSource: Send + Sync {
    /// All ratings the user has given. An unknown user has no ratings.
    async fn ratings(&self, user_id: i64) -> AppResult<Vec<MovieRating>>;
}

/// Generates personalized movie recommendations for a stored user
///
/// Reads the user's ratings, keeps the movies rated above the configured
/// threshold, and scores them against the most-similar movies store.
pub async fn recommend_for_user(
    ratings: &dyn RatingSource,
    similarities: &dyn SimilarityLookup,
    config: &RecommenderConfig,
    user_id: i64,
) -> AppResult<TimestampedValue<MovieRecommendations>> {
    let user_ratings = ratings.ratings(user_id).await?;
    tracing::debug!(user_id, rating_count = user_ratings.len(), "Loaded user ratings");

    score_ratings(&user_ratings, similarities, config, None).await
}

/// Scores an explicit rating history
pub async fn score_ratings(
    user_ratings: &[MovieRating],
    similarities: &dyn SimilarityLookup,
    config: &RecommenderConfig,
    events: Option<&dyn EventSink>,
) -> AppResult<TimestampedValue<MovieRecommendations>> {
    let liked = recommender::liked_movies(user_ratings, config.like_threshold());
    let recommendations = recommender::recommend(&liked, similarities, config, events).await?;

    Ok(TimestampedValue::now(recommendations))
}
