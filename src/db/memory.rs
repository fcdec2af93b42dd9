use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{MovieId, MovieRating, SortedSimilarities},
    services::{RatingSource, SimilarityLookup},
};

/// Most-similar movies held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySimilarityStore {
    rows: HashMap<MovieId, SortedSimilarities>,
}

impl InMemorySimilarityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the similarity row for `movie_id`
    pub fn with_similarities(
        mut self,
        movie_id: MovieId,
        similarities: Vec<(MovieId, f64)>,
    ) -> Self {
        self.insert(movie_id, similarities);
        self
    }

    pub fn insert(&mut self, movie_id: MovieId, similarities: Vec<(MovieId, f64)>) {
        self.rows
            .insert(movie_id, SortedSimilarities::from(similarities));
    }
}

#[async_trait::async_trait]
impl SimilarityLookup for InMemorySimilarityStore {
    async fn lookup(&self, movie_id: MovieId) -> AppResult<Option<SortedSimilarities>> {
        Ok(self.rows.get(&movie_id).cloned())
    }
}

/// Per-user rating histories held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRatingStore {
    users: HashMap<i64, Vec<MovieRating>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rating(mut self, user_id: i64, movie_id: MovieId, rating: f64) -> Self {
        self.users
            .entry(user_id)
            .or_default()
            .push(MovieRating::new(movie_id, rating));
        self
    }
}

#[async_trait::async_trait]
impl RatingSource for InMemoryRatingStore {
    async fn ratings(&self, user_id: i64) -> AppResult<Vec<MovieRating>> {
        Ok(self.users.get(&user_id).cloned().unwrap_or_default())
    }
}
