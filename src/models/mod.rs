use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a movie, shared by ratings, similarity rows and recommendations
pub type MovieId = i64;

/// One rating a user gave to a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRating {
    pub movie_id: MovieId,
    /// Rating on a 0-5 scale
    pub rating: f64,
    /// When the rating was recorded, if known
    #[serde(default)]
    pub rated_at: Option<DateTime<Utc>>,
}

impl MovieRating {
    pub fn new(movie_id: MovieId, rating: f64) -> Self {
        Self {
            movie_id,
            rating,
            rated_at: None,
        }
    }
}

/// A weighted edge of the item-item similarity graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemSimilarityScore {
    pub item: MovieId,
    /// Non-negative similarity weight
    pub similarity: f64,
}

impl ItemSimilarityScore {
    pub fn new(item: MovieId, similarity: f64) -> Self {
        Self { item, similarity }
    }
}

/// The most-similar movies for one source movie
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortedSimilarities {
    pub similarities: Vec<ItemSimilarityScore>,
}

impl SortedSimilarities {
    pub fn new(similarities: Vec<ItemSimilarityScore>) -> Self {
        Self { similarities }
    }
}

impl From<Vec<(MovieId, f64)>> for SortedSimilarities {
    fn from(pairs: Vec<(MovieId, f64)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(item, similarity)| ItemSimilarityScore::new(item, similarity))
                .collect(),
        )
    }
}

/// A single recommended movie with its aggregated score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub weight: f64,
}

/// Recommendations for one user, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecommendations {
    pub recommendations: Vec<MovieRecommendation>,
}

impl MovieRecommendations {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    /// Movie ids in ranked order
    pub fn movie_ids(&self) -> Vec<MovieId> {
        self.recommendations.iter().map(|r| r.movie_id).collect()
    }
}

/// A value paired with the time it was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedValue<T> {
    pub value: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> TimestampedValue<T> {
    /// Stamps `value` with the current time
    pub fn now(value: T) -> Self {
        Self {
            value,
            timestamp: Utc::now(),
        }
    }
}
