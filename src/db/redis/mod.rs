pub mod similarity;

pub use similarity::create_redis_client;
pub use similarity::RedisSimilarityStore;
pub use similarity::StoreKey;
