//! Factory for the database client and repositories

use crate::client::DbClient;
use crate::error::DbError;
use crate::repositories::{
    AvailabilityRepository, BusyCacheRepository, LedgerRepository, SqlAvailabilityRepository,
    SqlBusyCacheRepository, SqlLedgerRepository,
};
use bookwell_config::{AppConfig, DatabaseConfig};
use std::sync::Arc;
use tracing::debug;

/// Factory for creating database clients and the repositories on top of them
#[derive(Debug, Clone)]
pub struct DbClientFactory;

impl DbClientFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create a database client from the application configuration.
    pub async fn from_app_config(&self, config: &Arc<AppConfig>) -> Result<DbClient, DbError> {
        debug!("Creating database client from application configuration");
        DbClient::new(config).await
    }

    /// Create a database client from a database configuration.
    pub async fn from_db_config(&self, db_config: &DatabaseConfig) -> Result<DbClient, DbError> {
        DbClient::from_config(db_config).await
    }

    /// Create a database client from a database URL.
    pub async fn from_url(&self, db_url: &str) -> Result<DbClient, DbError> {
        DbClient::from_url(db_url).await
    }
}

impl Default for DbClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// The three repositories over one shared client, with their schemas applied.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub availability: SqlAvailabilityRepository,
    pub ledger: SqlLedgerRepository,
    pub busy_cache: SqlBusyCacheRepository,
}

impl Repositories {
    /// Build the repositories and create any missing tables.
    pub async fn init(db_client: DbClient) -> Result<Self, DbError> {
        let repos = Self {
            availability: SqlAvailabilityRepository::new(db_client.clone()),
            ledger: SqlLedgerRepository::new(db_client.clone()),
            busy_cache: SqlBusyCacheRepository::new(db_client),
        };
        repos.availability.init_schema().await?;
        repos.ledger.init_schema().await?;
        repos.busy_cache.init_schema().await?;
        Ok(repos)
    }
}
