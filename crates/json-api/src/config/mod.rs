//! Server configuration module

use clap::Parser;

use crate::config::{
    auth::AuthConfig, observability::LoggingConfig, server::ServerRuntimeConfig,
    stock::StockConfig, storage::StorageConfig,
};

pub(crate) mod auth;
pub(crate) mod observability;
pub(crate) mod server;
pub(crate) mod stock;
pub(crate) mod storage;

/// StockSync JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "stocksync-json", about = "StockSync JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Inventory storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Stock movement and alert routing settings.
    #[command(flatten)]
    pub stock: StockConfig,

    /// API token settings.
    #[command(flatten)]
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
