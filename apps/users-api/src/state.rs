//! Application state management.
//!
//! Shared state handed to the routers: configuration, the JWT issuer and
//! the storage backend selected at startup.

use axum_helpers::JwtAuth;
use database::postgres::{self, DatabaseConnection};
use domain_users::InMemoryUserRepository;
use migration::Migrator;
use tracing::info;

use crate::config::{Config, StorageBackend};

/// Storage backend handle. Cloning shares the underlying map or pool.
#[derive(Clone)]
pub enum Storage {
    InMemory(InMemoryUserRepository),
    Postgres(DatabaseConnection),
}

/// Shared application state (cheap to clone).
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jwt_auth: JwtAuth,
    pub storage: Storage,
}

impl AppState {
    /// Builds the state, connecting to Postgres and applying migrations when configured
    pub async fn init(config: Config) -> eyre::Result<Self> {
        let storage = match &config.storage {
            StorageBackend::InMemory => {
                info!("Using seeded in-memory user store");
                Storage::InMemory(InMemoryUserRepository::seeded())
            }
            StorageBackend::Postgres(pg) => {
                let db = postgres::connect_from_config_with_retry(pg.clone(), None)
                    .await
                    .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

                postgres::run_migrations::<Migrator>(&db, config.app.name)
                    .await
                    .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

                Storage::Postgres(db)
            }
        };

        Ok(Self::new(config, storage))
    }

    pub fn new(config: Config, storage: Storage) -> Self {
        let jwt_auth = JwtAuth::new(&config.jwt);
        Self {
            config,
            jwt_auth,
            storage,
        }
    }

    /// Closes the database pool, if any
    pub async fn close(self) {
        if let Storage::Postgres(db) = self.storage {
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        }
    }
}
