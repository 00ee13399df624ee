//! Domain service for the pricing rate table and its change history.

use crate::models::{Rate, RateHistoryEntry, RateInput};
use thiserror::Error;

/// Errors specific to rate operations. Reads degrade to defaults instead of
/// failing, so only writes surface errors.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for RateError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

/// Domain service trait for rates.
#[async_trait::async_trait]
pub trait RateService: Send + Sync {
    /// The current rate table: built-in defaults overlaid with persisted
    /// values. An empty store is seeded on the way through.
    async fn get_rates(&self) -> Vec<Rate>;

    /// Applies an update: snapshots the pre-update table into history, then
    /// merges `new_rates` by key and persists both documents.
    ///
    /// Returns the merged table.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Storage`] if persisting either document fails.
    async fn update_rates(
        &self,
        new_rates: &[RateInput],
        changed_by_id: &str,
        changed_by_name: &str,
    ) -> Result<Vec<Rate>, RateError>;

    /// The newest `limit` history entries, newest first. Never mutates
    /// storage.
    async fn get_rate_history(&self, limit: usize) -> Vec<RateHistoryEntry>;
}
