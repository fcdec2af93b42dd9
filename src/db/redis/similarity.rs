use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::error::{AppError, AppResult};
use crate::models::{MovieId, SortedSimilarities};
use crate::services::SimilarityLookup;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    MostSimilar(MovieId),
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKey::MostSimilar(movie_id) => write!(f, "most_similar:{}", movie_id),
        }
    }
}

/// Creates a Redis client for the most-similar movies store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Most-similar movies stored in Redis as JSON, one key per source movie
///
/// All lookups share one multiplexed connection, reconnected on failure by the
/// connection manager.
#[derive(Clone)]
pub struct RedisSimilarityStore {
    connection: ConnectionManager,
}

impl RedisSimilarityStore {
    /// Opens the shared connection
    pub async fn connect(redis_client: Client) -> anyhow::Result<Self> {
        let connection = ConnectionManager::new(redis_client).await?;
        Ok(Self { connection })
    }
}

#[async_trait::async_trait]
impl SimilarityLookup for RedisSimilarityStore {
    /// Connection and command errors are lookup failures. A missing key is `None`.
    async fn lookup(&self, movie_id: MovieId) -> AppResult<Option<SortedSimilarities>> {
        let key = StoreKey::MostSimilar(movie_id);
        let mut conn = self.connection.clone();
        let stored: Option<String> = conn.get(key.to_string()).await.map_err(lookup_failure)?;

        match stored {
            Some(json) => decode(&key, &json).map(Some),
            None => Ok(None),
        }
    }
}

fn lookup_failure(e: redis::RedisError) -> AppError {
    tracing::warn!(error = %e, "Redis similarity read failed");
    AppError::LookupFailure(e.to_string())
}

/// A row that exists but cannot be decoded, or carries a negative weight, is a
/// store fault, not a miss
fn decode(key: &StoreKey, json: &str) -> AppResult<SortedSimilarities> {
    let row: SortedSimilarities = serde_json::from_str(json).map_err(|e| {
        AppError::LookupFailure(format!("Corrupt similarity row {}: {}", key, e))
    })?;

    if let Some(bad) = row
        .similarities
        .iter()
        .find(|entry| entry.similarity < 0.0 || entry.similarity.is_nan())
    {
        return Err(AppError::LookupFailure(format!(
            "Similarity row {} has invalid weight {} for movie {}",
            key, bad.similarity, bad.item
        )));
    }

    Ok(row)
}
