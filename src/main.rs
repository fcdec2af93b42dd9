use std::sync::Arc;

use movie_advisor::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, PgRatingSource, RedisSimilarityStore},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let recommender = config.recommender()?;

    let pool = create_pool(&config.database_url).await?;
    let redis_client = create_redis_client(&config.redis_url)?;

    let state = AppState::new(
        Arc::new(PgRatingSource::new(pool)),
        Arc::new(RedisSimilarityStore::connect(redis_client).await?),
        recommender,
    );
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        address = %address,
        like_threshold = recommender.like_threshold(),
        recommendation_cap = recommender.max_recommendations(),
        concurrent_lookups = recommender.concurrent_lookups(),
        lookup_concurrency = recommender.lookup_concurrency(),
        "Server running"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
