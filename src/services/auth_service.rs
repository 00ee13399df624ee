//! Domain service for accounts and login.
//!
//! Admins authenticate with a password, employees with a short-lived OTP
//! issued on demand. Session state lives with the caller; this service only
//! answers credential questions and manages the account roster.

use crate::models::Role;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors specific to account and login operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Login method not supported for this account")]
    UnsupportedLoginMethod,

    #[error("No OTP has been issued for this user")]
    OtpNotIssued,

    #[error("OTP has expired")]
    OtpExpired,

    #[error("A user with id '{0}' already exists")]
    DuplicateId(String),

    #[error("Account '{0}' is protected and cannot be deleted")]
    ProtectedAccount(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

/// Account DTO for login and lookup responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Account DTO for listings. Never carries credentials; for employees the
/// OTP issue time is exposed so a pending code can be shown as such.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_created_at: Option<DateTime<Utc>>,
}

/// A freshly issued OTP, returned to the caller for delivery.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedOtp {
    pub otp: String,
}

/// Domain service trait for accounts and login.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Looks up an account by id, case-insensitively.
    async fn fetch_user_details(&self, user_id: &str) -> Result<UserInfo, AuthError>;

    /// Password login. Only admin accounts support this path.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnsupportedLoginMethod`] for employee accounts
    /// and [`AuthError::InvalidCredentials`] on a wrong password.
    async fn login(&self, user_id: &str, password: &str) -> Result<UserInfo, AuthError>;

    /// Issues a fresh OTP for an employee, replacing any previous one.
    async fn generate_otp(&self, user_id: &str) -> Result<IssuedOtp, AuthError>;

    /// Checks a submitted OTP. Expiry is checked before the code itself, and
    /// a successful check leaves the stored code in place.
    async fn verify_otp(&self, user_id: &str, otp: &str) -> Result<UserInfo, AuthError>;

    /// Creates an account. The password is only stored (hashed) for admins;
    /// employees never carry one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateId`] when the id is already taken,
    /// compared case-insensitively.
    async fn add_user(
        &self,
        id: &str,
        name: &str,
        password: Option<&str>,
        role: Role,
    ) -> Result<UserSummary, AuthError>;

    /// Deletes an account by exact id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ProtectedAccount`] for the built-in accounts,
    /// before the store is even consulted.
    async fn delete_user(&self, id: &str) -> Result<(), AuthError>;

    /// Updates an admin's display name and/or password. Either field may be
    /// given alone; the other keeps its stored value.
    async fn update_admin(
        &self,
        admin_id: &str,
        name: Option<&str>,
        new_password: Option<&str>,
    ) -> Result<UserSummary, AuthError>;

    /// All accounts as credential-free summaries.
    async fn list_users(&self) -> Result<Vec<UserSummary>, AuthError>;

    /// Clears an employee's OTP state. A no-op when none is pending.
    async fn revoke_otp(&self, user_id: &str) -> Result<(), AuthError>;
}
