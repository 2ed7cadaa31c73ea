//! State shared by every tool handler.

use std::sync::Arc;

use wayside_client::{Agent, FetchClient, FetchConfig, Fetcher, NotificationDefaults, Registration};
use wayside_core::{AppConfig, CacheDb, Error};

use crate::host::LogNotifier;

pub struct AppState {
    pub config: AppConfig,
    pub db: CacheDb,
    pub fetcher: Arc<dyn Fetcher>,
    pub registration: Registration,
    pub notifier: Arc<LogNotifier>,
}

impl AppState {
    pub fn new(config: AppConfig, db: CacheDb, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { config, db, fetcher, registration: Registration::new(), notifier: Arc::new(LogNotifier::default()) }
    }

    /// Open the on-disk cache and HTTP client described by `config`.
    pub async fn open(config: AppConfig) -> Result<Self, Error> {
        let db = CacheDb::open(&config.db_path)
            .await?
            .with_max_entry_bytes(config.max_entry_bytes);
        let fetcher = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
        Ok(Self::new(config, db, fetcher))
    }

    /// The generation `version` of the configured namespace.
    pub fn agent(&self, version: &str) -> Result<Agent, Error> {
        let config = AppConfig { version: version.trim().to_string(), ..self.config.clone() };
        config.validate().map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(Agent::from_config(&config, Arc::new(self.db.clone()), self.fetcher.clone()))
    }

    pub fn notification_defaults(&self) -> NotificationDefaults {
        NotificationDefaults::from(&self.config)
    }
}
