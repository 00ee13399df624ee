//! System endpoints.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};
use crate::constants::limits;

/// Returns version, uptime and store counts.
///
/// # Endpoint
/// `GET /api/system/status`
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let rates = state.rate_service().get_rates().await;
    let history = state
        .rate_service()
        .get_rate_history(limits::HISTORY_CAP)
        .await;
    let users = state.auth_service().list_users().await?;

    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        rate_count: rates.len(),
        history_entries: history.len(),
        user_count: users.len(),
    };

    Ok(Json(ApiResponse::success(status)))
}
