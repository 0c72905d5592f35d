use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::{
    repositories::{InMemoryRoomRepository, PgRoomRepository, RoomRepository},
    routes,
    service::RoomService,
    state::AppState,
};
use common::{
    cache::{RedisConfig, RedisPool},
    config::{ServerConfig, StorageBackend},
    database::{self, DatabaseConfig, init_pool},
    token::TokenVerifier,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting API service");

    let server_config = ServerConfig::from_env("API", 3001)?;
    let token_verifier = TokenVerifier::from_env()?;

    // Revoked tokens are shared with the auth service through Redis
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    if !redis_pool.health_check().await? {
        anyhow::bail!("Failed to connect to Redis");
    }

    let repository: Arc<dyn RoomRepository> = match server_config.storage {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            database::migrate(&pool).await?;
            Arc::new(PgRoomRepository::new(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory room storage; rooms are lost on restart");
            Arc::new(InMemoryRoomRepository::new())
        }
    };

    let app_state = AppState {
        room_service: RoomService::new(repository),
        token_verifier,
        revocations: Arc::new(redis_pool),
    };

    info!("API service initialized successfully");

    let app = routes::create_router(app_state);

    let address = server_config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
