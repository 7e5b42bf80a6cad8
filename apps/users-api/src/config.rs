use axum_helpers::JwtConfig;
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::postgres::PostgresConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Which `UserRepository` implementation backs the API, from `DB_TYPE`
#[derive(Clone, Debug)]
pub enum StorageBackend {
    /// Seeded in-memory store (default)
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::InMemory => "in_memory",
            StorageBackend::Postgres(_) => "postgres",
        }
    }
}

/// `DB_TYPE`: `in_memory` (default, also when empty) or `postgres`.
/// `postgres` additionally requires `DATABASE_URL`.
impl FromEnv for StorageBackend {
    fn from_env() -> Result<Self, ConfigError> {
        let db_type = env_or_default("DB_TYPE", "in_memory");

        match db_type.trim().to_ascii_lowercase().as_str() {
            "" | "in_memory" | "inmemory" => Ok(StorageBackend::InMemory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres(PostgresConfig::from_env()?)),
            other => Err(ConfigError::ParseError {
                key: "DB_TYPE".to_string(),
                details: format!("unknown storage backend '{}' (expected in_memory or postgres)", other),
            }),
        }
    }
}

/// Application configuration composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub storage: StorageBackend,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=3000 by default
        let jwt = JwtConfig::from_env()?; // Required - will fail if not set
        let storage = StorageBackend::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            jwt,
            storage,
            environment,
        })
    }
}
