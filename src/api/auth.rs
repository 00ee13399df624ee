//! Login endpoints.
//!
//! Two distinct paths: password login for admins and OTP request/verify for
//! employees. Session state is the caller's concern; a successful response
//! only confirms the credentials.

use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::auth_service::{AuthError, IssuedOtp, UserInfo};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct OtpRequest {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub user_id: String,
    pub otp: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserNotFound => Self::NotFound(err.to_string()),
            AuthError::InvalidCredentials | AuthError::OtpNotIssued | AuthError::OtpExpired => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::UnsupportedLoginMethod => Self::ValidationError(err.to_string()),
            AuthError::DuplicateId(_) => Self::Conflict(err.to_string()),
            AuthError::ProtectedAccount(_) => Self::Forbidden(err.to_string()),
            AuthError::Storage(msg) => Self::StorageError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Password login for admin accounts.
///
/// # Endpoint
/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(ApiError::validation("User id is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state
        .auth_service()
        .login(&payload.user_id, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// Issues an OTP for an employee and returns it for delivery.
///
/// # Endpoint
/// `POST /api/auth/otp/request`
pub async fn request_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OtpRequest>,
) -> Result<Json<ApiResponse<IssuedOtp>>, ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(ApiError::validation("User id is required"));
    }

    let issued = state.auth_service().generate_otp(&payload.user_id).await?;
    Ok(Json(ApiResponse::success(issued)))
}

/// Verifies a submitted OTP and returns the account on success.
///
/// # Endpoint
/// `POST /api/auth/otp/verify`
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    if payload.user_id.trim().is_empty() {
        return Err(ApiError::validation("User id is required"));
    }
    if payload.otp.trim().is_empty() {
        return Err(ApiError::validation("OTP is required"));
    }

    let user = state
        .auth_service()
        .verify_otp(&payload.user_id, &payload.otp)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}
