//! Listener configuration shared by the services
//!
//! Each service reads its settings from environment variables carrying its
//! own prefix, e.g. `API_HOST`/`API_PORT` or `AUTH_HOST`/`AUTH_PORT`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::net::SocketAddr;

/// Backing store for room data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL via `DATABASE_URL`
    #[default]
    Postgres,
    /// Process-local store, lost on restart
    Memory,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Room storage backend
    #[serde(default)]
    pub storage: StorageBackend,
}

impl ServerConfig {
    /// Load the configuration for a service
    ///
    /// # Environment Variables
    /// - `<PREFIX>_HOST`: interface to bind (default: "0.0.0.0")
    /// - `<PREFIX>_PORT`: port to bind (default: `default_port`)
    /// - `<PREFIX>_STORAGE`: "postgres" or "memory" (default: "postgres")
    pub fn from_env(prefix: &str, default_port: u16) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", i64::from(default_port))?
            .set_default("storage", "postgres")?
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Socket address to bind
    pub fn bind_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
