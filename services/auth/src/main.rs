use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use auth::{
    jwt::{JwtConfig, JwtService},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::UserRepository,
    routes,
    session::SessionManager,
    state::AppState,
};
use common::{
    cache::{RedisConfig, RedisPool},
    config::ServerConfig,
    database::{self, DatabaseConfig, init_pool},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting authentication service");

    let server_config = ServerConfig::from_env("AUTH", 3000)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::migrate(&pool).await?;

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config)?;

    // Initialize Redis connection pool
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    if !redis_pool.health_check().await? {
        anyhow::bail!("Failed to connect to Redis");
    }

    let session_manager =
        SessionManager::new(redis_pool.clone(), jwt_service.refresh_token_expiry());

    let app_state = AppState {
        user_repository: UserRepository::new(pool),
        session_manager,
        revocations: Arc::new(redis_pool),
        jwt_service,
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let address = server_config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
