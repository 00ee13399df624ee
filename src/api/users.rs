//! Account management endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::MessageResponse;
use super::{ApiError, ApiResponse, AppState};
use crate::models::Role;
use crate::services::auth_service::{UserInfo, UserSummary};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub id: String,
    pub name: String,
    pub password: Option<String>,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct UpdateAdminRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Lists all accounts without credential material.
///
/// # Endpoint
/// `GET /api/users`
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let users = state.auth_service().list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// Looks up one account by id.
///
/// # Endpoint
/// `GET /api/users/{id}`
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state.auth_service().fetch_user_details(&id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// Creates an account.
///
/// # Endpoint
/// `POST /api/users`
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    if payload.id.trim().is_empty() {
        return Err(ApiError::validation("User id is required"));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Name is required"));
    }

    let summary = state
        .auth_service()
        .add_user(
            &payload.id,
            &payload.name,
            payload.password.as_deref(),
            payload.role,
        )
        .await?;

    Ok(Json(ApiResponse::success(summary)))
}

/// Updates an admin's name and/or password.
///
/// # Endpoint
/// `PUT /api/users/{id}`
pub async fn update_admin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAdminRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    if payload.name.is_none() && payload.password.is_none() {
        return Err(ApiError::validation(
            "Provide a name or a password to update",
        ));
    }

    let summary = state
        .auth_service()
        .update_admin(&id, payload.name.as_deref(), payload.password.as_deref())
        .await?;

    Ok(Json(ApiResponse::success(summary)))
}

/// Deletes an account by exact id. The built-in accounts are refused.
///
/// # Endpoint
/// `DELETE /api/users/{id}`
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service().delete_user(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "User '{id}' deleted"
    )))))
}

/// Clears a pending OTP for an employee.
///
/// # Endpoint
/// `POST /api/users/{id}/otp/revoke`
pub async fn revoke_otp(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service().revoke_otp(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "OTP revoked for '{id}'"
    )))))
}
