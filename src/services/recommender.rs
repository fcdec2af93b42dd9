//! Item-item recommendation scoring.
//!
//! Each liked movie contributes its precomputed most-similar movies, weighted by
//! similarity. Contributions to the same candidate are summed, movies the user
//! already likes are never candidates, and the best `max_recommendations`
//! candidates are returned highest score first.

use std::collections::{BTreeSet, HashMap};

use futures::{StreamExt, TryStreamExt};

use crate::{
    error::{AppError, AppResult},
    models::{MovieId, MovieRating, MovieRecommendation, MovieRecommendations, SortedSimilarities},
};

/// Ratings strictly above this mark a movie as liked
pub const DEFAULT_LIKE_THRESHOLD: f64 = 3.5;

/// Maximum recommendations returned per call
pub const DEFAULT_RECOMMENDATION_CAP: usize = 10;

/// Lookups kept in flight at once on the concurrent path
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 8;

/// Scoring parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommenderConfig {
    like_threshold: f64,
    max_recommendations: usize,
    concurrent_lookups: bool,
    lookup_concurrency: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            like_threshold: DEFAULT_LIKE_THRESHOLD,
            max_recommendations: DEFAULT_RECOMMENDATION_CAP,
            concurrent_lookups: false,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }
}

impl RecommenderConfig {
    /// Creates a config, rejecting a non-finite threshold or a zero cap
    pub fn new(like_threshold: f64, max_recommendations: usize) -> AppResult<Self> {
        if !like_threshold.is_finite() {
            return Err(AppError::InvalidInput(format!(
                "like threshold must be finite, got {}",
                like_threshold
            )));
        }
        if max_recommendations == 0 {
            return Err(AppError::InvalidInput(
                "recommendation cap must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            like_threshold,
            max_recommendations,
            concurrent_lookups: false,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        })
    }

    pub fn with_concurrent_lookups(mut self, enabled: bool) -> Self {
        self.concurrent_lookups = enabled;
        self
    }

    /// Bounds in-flight lookups on the concurrent path; zero is treated as one
    pub fn with_lookup_concurrency(mut self, limit: usize) -> Self {
        self.lookup_concurrency = limit.max(1);
        self
    }

    pub fn like_threshold(&self) -> f64 {
        self.like_threshold
    }

    pub fn max_recommendations(&self) -> usize {
        self.max_recommendations
    }

    pub fn concurrent_lookups(&self) -> bool {
        self.concurrent_lookups
    }

    pub fn lookup_concurrency(&self) -> usize {
        self.lookup_concurrency
    }
}

/// Keyed access to the precomputed most-similar movies
///
/// `Ok(None)` means the movie has no similarity row. `Err` means the store could
/// not be queried; implementations own any retry or timeout policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SimilarityLookup: Send + Sync {
    async fn lookup(&self, movie_id: MovieId) -> AppResult<Option<SortedSimilarities>>;
}

/// Observability events emitted during one scoring call
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringEvent {
    /// A liked movie had no similarity row and was skipped
    LookupMiss { movie_id: MovieId },
    /// Scoring finished
    Scored {
        liked: usize,
        candidates: usize,
        returned: usize,
    },
}

/// Receives [`ScoringEvent`]s. Never consulted for control flow.
pub trait EventSink: Send + Sync {
    fn record(&self, event: ScoringEvent);
}

/// Movies the user rated strictly above `like_threshold`
pub fn liked_movies(ratings: &[MovieRating], like_threshold: f64) -> BTreeSet<MovieId> {
    ratings
        .iter()
        .filter(|r| r.rating > like_threshold)
        .map(|r| r.movie_id)
        .collect()
}

/// Scores candidates for `liked`, using the lookup strategy selected by `config`
pub async fn recommend<L>(
    liked: &BTreeSet<MovieId>,
    lookup: &L,
    config: &RecommenderConfig,
    events: Option<&dyn EventSink>,
) -> AppResult<MovieRecommendations>
where
    L: SimilarityLookup + ?Sized,
{
    if config.concurrent_lookups {
        recommend_concurrent(liked, lookup, config, events).await
    } else {
        recommend_sequential(liked, lookup, config, events).await
    }
}

/// Issues one lookup per liked movie, in ascending id order
pub async fn recommend_sequential<L>(
    liked: &BTreeSet<MovieId>,
    lookup: &L,
    config: &RecommenderConfig,
    events: Option<&dyn EventSink>,
) -> AppResult<MovieRecommendations>
where
    L: SimilarityLookup + ?Sized,
{
    let mut scores = HashMap::new();

    for &movie_id in liked {
        let similar = lookup.lookup(movie_id).await.map_err(|e| {
            tracing::error!(movie_id, error = %e, "Similarity lookup failed");
            e
        })?;
        accumulate(&mut scores, liked, movie_id, similar, events);
    }

    Ok(rank(scores, liked.len(), config.max_recommendations, events))
}

/// Keeps up to `lookup_concurrency` lookups in flight, then merges the results
/// in ascending liked-id order
///
/// The merge order matches [`recommend_sequential`], so both produce identical
/// scores down to floating-point summation order.
pub async fn recommend_concurrent<L>(
    liked: &BTreeSet<MovieId>,
    lookup: &L,
    config: &RecommenderConfig,
    events: Option<&dyn EventSink>,
) -> AppResult<MovieRecommendations>
where
    L: SimilarityLookup + ?Sized,
{
    let fetched: Vec<(MovieId, Option<SortedSimilarities>)> =
        futures::stream::iter(liked.iter().copied())
            .map(|movie_id| async move {
                lookup
                    .lookup(movie_id)
                    .await
                    .map(|similar| (movie_id, similar))
                    .map_err(|e| {
                        tracing::error!(movie_id, error = %e, "Similarity lookup failed");
                        e
                    })
            })
            .buffered(config.lookup_concurrency)
            .try_collect()
            .await?;

    let mut scores = HashMap::new();
    for (movie_id, similar) in fetched {
        accumulate(&mut scores, liked, movie_id, similar, events);
    }

    Ok(rank(scores, liked.len(), config.max_recommendations, events))
}

fn accumulate(
    scores: &mut HashMap<MovieId, f64>,
    liked: &BTreeSet<MovieId>,
    movie_id: MovieId,
    similar: Option<SortedSimilarities>,
    events: Option<&dyn EventSink>,
) {
    let Some(similar) = similar else {
        tracing::info!(movie_id, "Could not find any similar movies");
        if let Some(sink) = events {
            sink.record(ScoringEvent::LookupMiss { movie_id });
        }
        return;
    };

    for entry in similar.similarities {
        // Already liked, so already seen
        if liked.contains(&entry.item) {
            continue;
        }
        *scores.entry(entry.item).or_insert(0.0) += entry.similarity;
    }
}

fn rank(
    scores: HashMap<MovieId, f64>,
    liked_count: usize,
    max_recommendations: usize,
    events: Option<&dyn EventSink>,
) -> MovieRecommendations {
    let candidates = scores.len();
    let mut ranked: Vec<MovieRecommendation> = scores
        .into_iter()
        .map(|(movie_id, weight)| MovieRecommendation { movie_id, weight })
        .collect();

    // Highest score first; equal scores by ascending movie id
    ranked.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.movie_id.cmp(&b.movie_id))
    });
    ranked.truncate(max_recommendations);

    tracing::debug!(
        liked = liked_count,
        candidates,
        returned = ranked.len(),
        "Scored recommendations"
    );
    if let Some(sink) = events {
        sink.record(ScoringEvent::Scored {
            liked: liked_count,
            candidates,
            returned: ranked.len(),
        });
    }

    MovieRecommendations {
        recommendations: ranked,
    }
}
