use std::sync::Arc;

use crate::services::{RatingSource, RecommenderConfig, SimilarityLookup};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ratings: Arc<dyn RatingSource>,
    pub similarities: Arc<dyn SimilarityLookup>,
    pub recommender: RecommenderConfig,
}

impl AppState {
    /// Creates application state over the given rating source and similarity store
    pub fn new(
        ratings: Arc<dyn RatingSource>,
        similarities: Arc<dyn SimilarityLookup>,
        recommender: RecommenderConfig,
    ) -> Self {
        Self {
            ratings,
            similarities,
            recommender,
        }
    }
}
