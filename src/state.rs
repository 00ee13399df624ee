use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, JsonAuthService, JsonRateService, RateService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub rate_service: Arc<dyn RateService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    /// State over flat files in the configured data directory. Storage is
    /// lazily initialized on first access, so this never touches the disk.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let store = Store::open(&config.general.data_dir);
        Self::with_store(config, store)
    }

    /// State over an explicit store, used by tests to swap in the in-memory
    /// backend.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let rate_service =
            Arc::new(JsonRateService::new(store.clone())) as Arc<dyn RateService>;
        let auth_service = Arc::new(JsonAuthService::new(store.clone(), config.security.clone()))
            as Arc<dyn AuthService>;

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            rate_service,
            auth_service,
        }
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
