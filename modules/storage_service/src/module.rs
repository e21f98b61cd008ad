//! Module wiring: database, migrations, domain service and API surfaces

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::StorageApi;
use crate::domain::{Service, StorageRepository};
use crate::infra::storage::{migrations::Migrator, SeaOrmStorageRepository};
use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Storage service module
pub struct StorageServiceModule {
    config: Config,
    service: Arc<Service>,
}

impl StorageServiceModule {
    /// Connect to the configured database, run migrations and build the service
    pub async fn init(config: Config) -> Result<Self> {
        config.validate()?;

        let mut options = ConnectOptions::new(config.database.url.clone());
        options
            .max_connections(config.database.max_connections)
            .sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .context("failed to connect to storage database")?;
        migrate(&db).await?;

        let repo = Arc::new(SeaOrmStorageRepository::new(Arc::new(db)));
        let module = Self::with_repository(config, repo);

        tracing::info!(
            default_page_size = module.config.default_page_size,
            max_page_size = module.config.max_page_size,
            "Storage service initialized"
        );
        Ok(module)
    }

    /// Build the module on top of an already constructed repository
    pub fn with_repository(config: Config, repo: Arc<dyn StorageRepository>) -> Self {
        let service = Arc::new(
            Service::new(repo).with_page_limits(config.default_page_size, config.max_page_size),
        );
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Native client for in-process calls
    pub fn client(&self) -> Arc<dyn StorageApi> {
        Arc::new(NativeClient::new(self.service.clone()))
    }

    /// REST routes backed by this module's service
    pub fn router(&self) -> axum::Router {
        tracing::info!("Registering storage service REST routes");
        crate::api::rest::routes::register_routes(axum::Router::new(), self.service.clone())
    }
}

/// Apply all pending storage migrations
pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None).await?;
    tracing::info!("Storage service migrations completed");
    Ok(())
}
