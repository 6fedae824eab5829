use crate::adapter::memory::{MemoryAffinityStore, MemoryDriverRoster, MemoryOutcomeLog};
use crate::adapter::postgres::{PgAffinityStore, PgDriverRoster, PgOutcomeLog, schema};
use crate::config::{Settings, StoreBackend};
use crate::error::AffinityError;
use crate::port::{AffinityStore, DriverRoster, OutcomeLog};
use crate::resolver::Resolver;
use crate::scorer::Trainer;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AffinityStore>,
    pub outcome_log: Arc<dyn OutcomeLog>,
    pub roster: Arc<dyn DriverRoster>,
    pub trainer: Arc<Trainer>,
    pub resolver: Arc<Resolver>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the trainer and resolver on top of the given ports.
    pub fn new(
        settings: Settings,
        store: Arc<dyn AffinityStore>,
        outcome_log: Arc<dyn OutcomeLog>,
        roster: Arc<dyn DriverRoster>,
    ) -> Self {
        let trainer = Arc::new(Trainer::new(Arc::clone(&outcome_log), Arc::clone(&store)));
        let resolver = Arc::new(Resolver::new(
            Arc::clone(&store),
            Arc::clone(&roster),
            settings.min_learned_samples,
        ));

        Self {
            store,
            outcome_log,
            roster,
            trainer,
            resolver,
            settings: Arc::new(settings),
        }
    }

    /// Create `AppState` from configuration settings.
    ///
    /// For the postgres backend this opens the pool and, unless disabled,
    /// applies the schema.
    pub async fn from_settings(settings: Settings) -> Result<Self, AffinityError> {
        match settings.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory store backend");
                Ok(Self::new(
                    settings,
                    Arc::new(MemoryAffinityStore::new()),
                    Arc::new(MemoryOutcomeLog::new()),
                    Arc::new(MemoryDriverRoster::new()),
                ))
            }
            StoreBackend::Postgres => {
                let url = settings.database_url.clone().ok_or_else(|| {
                    AffinityError::Config("APP_DATABASE_URL is not set".into())
                })?;
                let pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .connect(&url)
                    .await?;
                if settings.run_migrations {
                    schema::migrate(&pool).await?;
                }
                info!(
                    max_connections = settings.db_max_connections,
                    "Using postgres store backend"
                );

                Ok(Self::new(
                    settings,
                    Arc::new(PgAffinityStore::new(pool.clone())),
                    Arc::new(PgOutcomeLog::new(pool.clone())),
                    Arc::new(PgDriverRoster::new(pool)),
                ))
            }
        }
    }
}
