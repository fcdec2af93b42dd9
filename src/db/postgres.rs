use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    error::AppResult,
    models::{MovieId, MovieRating},
    services::RatingSource,
};

/// Creates a PostgreSQL connection pool
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    movie_id: MovieId,
    rating: f64,
    rated_at: Option<DateTime<Utc>>,
}

impl From<RatingRow> for MovieRating {
    fn from(row: RatingRow) -> Self {
        Self {
            movie_id: row.movie_id,
            rating: row.rating,
            rated_at: row.rated_at,
        }
    }
}

/// Reads user ratings from the `ratings` table
#[derive(Clone)]
pub struct PgRatingSource {
    pool: PgPool,
}

impl PgRatingSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RatingSource for PgRatingSource {
    async fn ratings(&self, user_id: i64) -> AppResult<Vec<MovieRating>> {
        let rows = sqlx::query_as::<_, RatingRow>(
            r#"
            SELECT movie_id, rating, rated_at
            FROM ratings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MovieRating::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_rating() {
        let row = RatingRow {
            movie_id: 7,
            rating: 4.5,
            rated_at: None,
        };
        assert_eq!(MovieRating::from(row), MovieRating::new(7, 4.5));
    }
}
