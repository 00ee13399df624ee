use crate::config::SecurityConfig;
use crate::models::{Rate, RateHistoryEntry, UserRecord};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub mod backend;
pub mod repositories;

pub use backend::{Entity, FileBackend, MemoryBackend, StorageBackend};

/// Facade over the storage backend with one writer lock per entity family.
///
/// Every write is a whole-document read-modify-write, so concurrent writers
/// would silently drop each other's changes. Callers take the matching lock
/// for the full cycle; rates and history share one lock because an update
/// touches both.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn StorageBackend>,
    rates_writer: Arc<Mutex<()>>,
    users_writer: Arc<Mutex<()>>,
}

impl Store {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            rates_writer: Arc::new(Mutex::new(())),
            users_writer: Arc::new(Mutex::new(())),
        }
    }

    /// Store over flat JSON files in `data_dir`.
    #[must_use]
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileBackend::new(data_dir)))
    }

    /// Ephemeral store for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    fn rate_repo(&self) -> repositories::rates::RateRepository {
        repositories::rates::RateRepository::new(self.backend.clone())
    }

    fn user_repo(&self) -> repositories::users::UserRepository {
        repositories::users::UserRepository::new(self.backend.clone())
    }

    pub async fn lock_rates_for_update(&self) -> OwnedMutexGuard<()> {
        self.rates_writer.clone().lock_owned().await
    }

    pub async fn lock_users_for_update(&self) -> OwnedMutexGuard<()> {
        self.users_writer.clone().lock_owned().await
    }

    pub async fn current_rates(&self) -> Vec<Rate> {
        self.rate_repo().current_rates().await
    }

    pub async fn save_rates(&self, rates: &[Rate]) -> Result<()> {
        self.rate_repo().save_rates(rates).await
    }

    pub async fn rate_history(&self) -> Vec<RateHistoryEntry> {
        self.rate_repo().full_history().await
    }

    pub async fn save_rate_history(&self, entries: &[RateHistoryEntry]) -> Result<()> {
        self.rate_repo().save_history(entries).await
    }

    pub async fn load_users(&self, security: &SecurityConfig) -> Result<Vec<UserRecord>> {
        self.user_repo().load_or_seed(security).await
    }

    pub async fn save_users(&self, records: &[UserRecord]) -> Result<()> {
        self.user_repo().save_users(records).await
    }
}
