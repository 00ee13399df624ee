//! Flat-file implementation of the `RateService` trait.

use crate::constants::limits;
use crate::db::Store;
use crate::db::repositories::rates::merge_rates;
use crate::models::{Rate, RateHistoryEntry, RateInput};
use crate::services::rate_service::{RateError, RateService};
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

pub struct JsonRateService {
    store: Store,
}

impl JsonRateService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RateService for JsonRateService {
    async fn get_rates(&self) -> Vec<Rate> {
        self.store.current_rates().await
    }

    async fn update_rates(
        &self,
        new_rates: &[RateInput],
        changed_by_id: &str,
        changed_by_name: &str,
    ) -> Result<Vec<Rate>, RateError> {
        // Single writer for the whole read-snapshot-merge-persist cycle.
        let _guard = self.store.lock_rates_for_update().await;

        let current = self.store.current_rates().await;
        let mut history = self.store.rate_history().await;

        let entry_id = history.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        history.insert(
            0,
            RateHistoryEntry {
                id: entry_id,
                changed_at: Utc::now(),
                changed_by_id: changed_by_id.to_string(),
                changed_by_name: changed_by_name.to_string(),
                rates_snapshot: current.clone(),
            },
        );
        history.truncate(limits::HISTORY_CAP);

        let merged = merge_rates(current, new_rates);

        self.store.save_rates(&merged).await?;
        self.store.save_rate_history(&history).await?;

        info!(
            "Rate table updated by {} ({} incoming rates, history entry #{})",
            changed_by_id,
            new_rates.len(),
            entry_id
        );

        Ok(merged)
    }

    async fn get_rate_history(&self, limit: usize) -> Vec<RateHistoryEntry> {
        let mut history = self.store.rate_history().await;
        history.truncate(limit);
        history
    }
}
