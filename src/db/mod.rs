pub mod memory;
pub mod postgres;
pub mod redis;

pub use memory::{InMemoryRatingStore, InMemorySimilarityStore};
pub use postgres::{create_pool, PgRatingSource};
pub use self::redis::{create_redis_client, RedisSimilarityStore};
