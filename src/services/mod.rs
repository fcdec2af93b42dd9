pub mod recommendations;
pub mod recommender;

pub use recommendations::{recommend_for_user, score_ratings, RatingSource};
pub use recommender::{
    liked_movies, recommend, EventSink, RecommenderConfig, ScoringEvent, SimilarityLookup,
};
