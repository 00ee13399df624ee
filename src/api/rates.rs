//! Rate table endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::constants::limits;
use crate::models::{Rate, RateHistoryEntry, RateInput};
use crate::services::rate_service::RateError;

#[derive(Deserialize)]
pub struct UpdateRatesRequest {
    pub rates: Vec<RateInput>,
    pub changed_by_id: String,
    pub changed_by_name: String,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

impl From<RateError> for ApiError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::Storage(msg) => Self::StorageError(msg),
        }
    }
}

/// Returns the current rate table.
///
/// # Endpoint
/// `GET /api/rates`
///
/// Always answers with a full table; an empty or unreadable store is served
/// as the built-in defaults.
pub async fn get_rates(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<Rate>>> {
    let rates = state.rate_service().get_rates().await;
    Json(ApiResponse::success(rates))
}

/// Applies a rate update on behalf of the given actor.
///
/// # Endpoint
/// `PUT /api/rates`
///
/// The pre-update table is snapshotted into history before the merge.
pub async fn update_rates(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateRatesRequest>,
) -> Result<Json<ApiResponse<Vec<Rate>>>, ApiError> {
    if payload.changed_by_id.trim().is_empty() {
        return Err(ApiError::validation("Actor id is required"));
    }
    if payload.changed_by_name.trim().is_empty() {
        return Err(ApiError::validation("Actor name is required"));
    }
    if payload.rates.is_empty() {
        return Err(ApiError::validation("At least one rate is required"));
    }
    if payload.rates.iter().any(|r| r.key.trim().is_empty()) {
        return Err(ApiError::validation("Rate keys must not be empty"));
    }

    let merged = state
        .rate_service()
        .update_rates(
            &payload.rates,
            &payload.changed_by_id,
            &payload.changed_by_name,
        )
        .await?;

    Ok(Json(ApiResponse::success(merged)))
}

/// Returns the newest rate change snapshots.
///
/// # Endpoint
/// `GET /api/rates/history?limit=5`
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Json<ApiResponse<Vec<RateHistoryEntry>>> {
    let limit = query
        .limit
        .unwrap_or(limits::DEFAULT_HISTORY_LIMIT)
        .min(limits::HISTORY_CAP);
    let history = state.rate_service().get_rate_history(limit).await;
    Json(ApiResponse::success(history))
}
