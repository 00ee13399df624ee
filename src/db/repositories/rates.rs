use crate::constants::DEFAULT_RATES;
use crate::db::backend::{Entity, StorageBackend};
use crate::models::{Rate, RateHistoryEntry, RateInput};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

/// Typed access to the rate table and its change history.
pub struct RateRepository {
    backend: Arc<dyn StorageBackend>,
}

impl RateRepository {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub async fn load_rates(&self) -> Result<Option<Vec<Rate>>> {
        let Some(bytes) = self.backend.load(Entity::Rates).await? else {
            return Ok(None);
        };
        let rates = serde_json::from_slice(&bytes).context("malformed rates document")?;
        Ok(Some(rates))
    }

    pub async fn save_rates(&self, rates: &[Rate]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(rates).context("failed to serialize rates")?;
        self.backend.save(Entity::Rates, bytes).await
    }

    pub async fn load_history(&self) -> Result<Option<Vec<RateHistoryEntry>>> {
        let Some(bytes) = self.backend.load(Entity::RateHistory).await? else {
            return Ok(None);
        };
        let entries =
            serde_json::from_slice(&bytes).context("malformed rate history document")?;
        Ok(Some(entries))
    }

    pub async fn save_history(&self, entries: &[RateHistoryEntry]) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(entries).context("failed to serialize rate history")?;
        self.backend.save(Entity::RateHistory, bytes).await
    }

    /// Current rate table: the default set overlaid with whatever is
    /// persisted. An empty store is seeded with the defaults; an unreadable
    /// one is logged and served as plain defaults so pricing keeps working.
    pub async fn current_rates(&self) -> Vec<Rate> {
        match self.load_rates().await {
            Ok(Some(persisted)) => overlay_defaults(&persisted),
            Ok(None) => {
                let defaults = default_rates();
                match self.save_rates(&defaults).await {
                    Ok(()) => info!("Seeded default rate table ({} rates)", defaults.len()),
                    Err(err) => error!("Failed to seed default rate table: {err:#}"),
                }
                defaults
            }
            Err(err) => {
                error!("Rates storage is unreadable, serving defaults: {err:#}");
                default_rates()
            }
        }
    }

    /// Full history, newest first. Absent or unreadable history reads as
    /// empty; reads never fail the caller.
    pub async fn full_history(&self) -> Vec<RateHistoryEntry> {
        match self.load_history().await {
            Ok(Some(entries)) => entries,
            Ok(None) => Vec::new(),
            Err(err) => {
                error!("Rate history storage is unreadable: {err:#}");
                Vec::new()
            }
        }
    }
}

/// The built-in rate table with ids assigned in canonical order.
#[must_use]
pub fn default_rates() -> Vec<Rate> {
    DEFAULT_RATES
        .iter()
        .enumerate()
        .map(|(index, (key, value))| Rate::new(index as i64 + 1, *key, *value))
        .collect()
}

/// Overlays persisted values onto the default table.
///
/// Default entries keep their canonical ids and order and take the persisted
/// value when one exists for the key. Persisted extras are appended in file
/// order; an extra keeps its own id unless it is missing or collides, in
/// which case the running maximum id hands out a fresh one.
#[must_use]
pub fn overlay_defaults(persisted: &[Rate]) -> Vec<Rate> {
    let mut merged = default_rates();
    for rate in &mut merged {
        if let Some(saved) = persisted.iter().find(|p| p.key == rate.key) {
            rate.value = saved.value;
        }
    }

    let mut max_id = merged
        .iter()
        .chain(persisted)
        .map(|r| r.id)
        .max()
        .unwrap_or(0);

    for extra in persisted {
        if merged.iter().any(|r| r.key == extra.key) {
            continue;
        }
        let id = if extra.id > 0 && !merged.iter().any(|r| r.id == extra.id) {
            extra.id
        } else {
            max_id += 1;
            max_id
        };
        merged.push(Rate::new(id, extra.key.clone(), extra.value));
    }

    merged
}

/// Merges an update into the current table, key by key. Known keys take the
/// new value only; unknown keys are appended with their supplied id when it
/// is free, or a freshly generated one.
#[must_use]
pub fn merge_rates(current: Vec<Rate>, incoming: &[RateInput]) -> Vec<Rate> {
    let mut merged = current;
    for input in incoming {
        if let Some(existing) = merged.iter_mut().find(|r| r.key == input.key) {
            existing.value = input.value;
        } else {
            let id = match input.id {
                Some(id) if id > 0 && !merged.iter().any(|r| r.id == id) => id,
                _ => next_rate_id(&merged),
            };
            merged.push(Rate::new(id, input.key.clone(), input.value));
        }
    }
    merged
}

fn next_rate_id(rates: &[Rate]) -> i64 {
    rates.iter().map(|r| r.id).max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(key: &str, value: f64) -> RateInput {
        RateInput {
            id: None,
            key: key.to_string(),
            value,
        }
    }

    #[test]
    fn default_table_has_sixteen_rates_with_sequential_ids() {
        let defaults = default_rates();
        assert_eq!(defaults.len(), 16);
        for (index, rate) in defaults.iter().enumerate() {
            assert_eq!(rate.id, index as i64 + 1);
        }
        let natural = defaults.iter().find(|r| r.key == "natural").unwrap();
        assert_eq!(natural.value, 0.0);
        let profit = defaults.iter().find(|r| r.key == "profit").unwrap();
        assert_eq!(profit.value, 10.0);
    }

    #[test]
    fn overlay_takes_persisted_values_for_default_keys() {
        let persisted = vec![Rate::new(16, "profit", 15.0)];
        let merged = overlay_defaults(&persisted);

        assert_eq!(merged.len(), 16);
        let profit = merged.iter().find(|r| r.key == "profit").unwrap();
        assert_eq!(profit.value, 15.0);
        assert_eq!(profit.id, 16);
        // Untouched defaults keep their shipped values.
        let gst = merged.iter().find(|r| r.key == "gst").unwrap();
        assert_eq!(gst.value, 18.0);
    }

    #[test]
    fn overlay_appends_extras_after_defaults() {
        let persisted = vec![
            Rate::new(16, "profit", 12.0),
            Rate::new(17, "handling", 2.5),
        ];
        let merged = overlay_defaults(&persisted);

        assert_eq!(merged.len(), 17);
        assert_eq!(merged[16].key, "handling");
        assert_eq!(merged[16].id, 17);
    }

    #[test]
    fn overlay_assigns_fresh_ids_to_unidentified_extras() {
        // Hand-edited file: one extra without an id, one with a clashing id.
        let persisted = vec![
            Rate::new(0, "handling", 2.5),
            Rate::new(3, "packing", 1.0),
        ];
        let merged = overlay_defaults(&persisted);

        let handling = merged.iter().find(|r| r.key == "handling").unwrap();
        let packing = merged.iter().find(|r| r.key == "packing").unwrap();
        assert_eq!(handling.id, 17);
        assert_eq!(packing.id, 18);

        let mut ids: Vec<i64> = merged.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), merged.len());
    }

    #[test]
    fn merge_overwrites_value_only_for_known_keys() {
        let current = default_rates();
        let merged = merge_rates(current, &[input("profit", 15.0)]);

        assert_eq!(merged.len(), 16);
        let profit = merged.iter().find(|r| r.key == "profit").unwrap();
        assert_eq!(profit.value, 15.0);
        assert_eq!(profit.id, 16);
    }

    #[test]
    fn merge_appends_unknown_keys_with_generated_ids() {
        let merged = merge_rates(default_rates(), &[input("handling", 2.5)]);
        assert_eq!(merged.len(), 17);
        assert_eq!(merged[16].id, 17);

        // A second update of the same key must not duplicate the entry.
        let merged = merge_rates(merged, &[input("handling", 3.0)]);
        assert_eq!(merged.len(), 17);
        assert_eq!(merged[16].value, 3.0);
        assert_eq!(merged[16].id, 17);
    }

    #[test]
    fn merge_keeps_supplied_id_when_free() {
        let merged = merge_rates(
            default_rates(),
            &[RateInput {
                id: Some(40),
                key: "storage".to_string(),
                value: 1.5,
            }],
        );
        assert_eq!(merged[16].id, 40);

        // The next generated id continues past the kept one.
        let merged = merge_rates(merged, &[input("loading", 0.5)]);
        assert_eq!(merged[17].id, 41);
    }

    #[test]
    fn merge_regenerates_colliding_supplied_ids() {
        let merged = merge_rates(
            default_rates(),
            &[RateInput {
                id: Some(5),
                key: "storage".to_string(),
                value: 1.5,
            }],
        );
        let storage = merged.iter().find(|r| r.key == "storage").unwrap();
        assert_eq!(storage.id, 17);
    }
}
