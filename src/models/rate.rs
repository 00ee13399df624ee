use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single pricing factor, e.g. a raw material price or the GST percentage.
///
/// Keys are unique within the stored table; ids are stable once assigned and
/// survive value updates. An id of zero means "not yet assigned" and shows up
/// only in hand-edited files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    #[serde(default)]
    pub id: i64,
    pub key: String,
    pub value: f64,
}

impl Rate {
    #[must_use]
    pub fn new(id: i64, key: impl Into<String>, value: f64) -> Self {
        Self {
            id,
            key: key.into(),
            value,
        }
    }
}

/// One incoming rate in an update request. The id is optional; unknown keys
/// without one get a freshly generated id on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateInput {
    #[serde(default)]
    pub id: Option<i64>,
    pub key: String,
    pub value: f64,
}

/// Snapshot of the full rate table as it stood *before* one update was
/// applied, plus who applied it and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateHistoryEntry {
    pub id: i64,
    pub changed_at: DateTime<Utc>,
    pub changed_by_id: String,
    pub changed_by_name: String,
    pub rates_snapshot: Vec<Rate>,
}
