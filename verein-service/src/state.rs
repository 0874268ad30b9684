//! Application state management

use std::sync::Arc;

use crate::{
    config::Config,
    error::Result,
    graphql::{build_schema, ClubSchema},
    repository::{ClubStore, MemoryClubStore},
    service::ClubService,
};

/// Application state shared across handlers
///
/// Cloning is cheap: everything behind it is reference counted.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<dyn ClubStore>,
    service: ClubService,
    schema: ClubSchema,
}

impl AppState {
    /// Wire the service and the GraphQL schema around `store`
    pub fn new(config: Config, store: Arc<dyn ClubStore>) -> Self {
        let service = ClubService::new(Arc::clone(&store), config.pagination.clone());
        let schema = build_schema(service.clone());
        Self {
            config: Arc::new(config),
            store,
            service,
            schema,
        }
    }

    /// Pick the store from configuration
    ///
    /// Uses PostgreSQL when a database is configured, otherwise an in-memory
    /// store seeded with demo clubs.
    pub async fn from_config(config: Config) -> Result<Self> {
        let store = Self::connect_store(&config).await?;
        Ok(Self::new(config, store))
    }

    #[cfg(feature = "database")]
    async fn connect_store(config: &Config) -> Result<Arc<dyn ClubStore>> {
        match &config.database {
            Some(db_config) => {
                let pool = crate::database::create_pool(db_config).await?;
                Ok(Arc::new(crate::repository::PostgresClubStore::new(pool)))
            }
            None => Ok(Self::memory_store()),
        }
    }

    #[cfg(not(feature = "database"))]
    async fn connect_store(config: &Config) -> Result<Arc<dyn ClubStore>> {
        if config.database.is_some() {
            tracing::warn!("Database configured but the `database` feature is disabled");
        }
        Ok(Self::memory_store())
    }

    fn memory_store() -> Arc<dyn ClubStore> {
        tracing::info!("No database configured, serving in-memory demo data");
        Arc::new(MemoryClubStore::with_demo_data())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ClubStore> {
        &self.store
    }

    pub fn service(&self) -> &ClubService {
        &self.service
    }

    pub fn schema(&self) -> &ClubSchema {
        &self.schema
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}
