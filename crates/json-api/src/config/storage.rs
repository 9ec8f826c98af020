//! Storage Config

use clap::Args;

/// Where products and movements live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    /// `PostgreSQL`, migrated on startup.
    Postgres,

    /// Process memory; everything is lost on exit.
    Memory,
}

/// Storage settings.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Storage backend (postgres, memory)
    #[arg(long, env = "STORAGE_BACKEND", value_enum, default_value_t = StorageBackend::Postgres)]
    pub storage_backend: StorageBackend,

    /// `PostgreSQL` connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        hide_env_values = true,
        required_if_eq("storage_backend", "postgres")
    )]
    pub database_url: Option<String>,
}
