//! Flat-file implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::constants::{otp, users as user_constants};
use crate::db::Store;
use crate::db::repositories::users::{
    find_user, find_user_index, generate_otp_code, hash_password_blocking,
    verify_password_blocking,
};
use crate::models::{Role, UserKind, UserRecord};
use crate::services::auth_service::{AuthError, AuthService, IssuedOtp, UserInfo, UserSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

pub struct JsonAuthService {
    store: Store,
    security: SecurityConfig,
}

impl JsonAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn load_users(&self) -> Result<Vec<UserRecord>, AuthError> {
        Ok(self.store.load_users(&self.security).await?)
    }

    /// OTP check against an explicit clock. `verify_otp` passes the current
    /// time; tests pass exact offsets to pin down the expiry boundary.
    pub async fn verify_otp_at(
        &self,
        user_id: &str,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<UserInfo, AuthError> {
        let records = self.load_users().await?;
        let user = find_user(&records, user_id).ok_or(AuthError::UserNotFound)?;

        let UserKind::Employee { .. } = &user.kind else {
            return Err(AuthError::UnsupportedLoginMethod);
        };
        let (stored, created_at) = user.kind.active_otp().ok_or(AuthError::OtpNotIssued)?;

        // Staleness wins over correctness: an expired code is rejected as
        // expired even when it matches.
        let elapsed_ms = now.signed_duration_since(created_at).num_milliseconds();
        if elapsed_ms > otp::TTL_MS {
            return Err(AuthError::OtpExpired);
        }

        if stored != submitted {
            return Err(AuthError::InvalidCredentials);
        }

        // The code stays stored until it expires or is revoked, so a login
        // within the window can be retried after e.g. a dropped connection.
        Ok(user_info(user))
    }
}

fn user_info(user: &UserRecord) -> UserInfo {
    UserInfo {
        id: user.id.clone(),
        name: user.name.clone(),
        role: user.role(),
    }
}

fn user_summary(user: &UserRecord) -> UserSummary {
    let otp_created_at = match &user.kind {
        UserKind::Employee { otp_created_at, .. } => *otp_created_at,
        UserKind::Admin { .. } => None,
    };
    UserSummary {
        id: user.id.clone(),
        name: user.name.clone(),
        role: user.role(),
        otp_created_at,
    }
}

#[async_trait]
impl AuthService for JsonAuthService {
    async fn fetch_user_details(&self, user_id: &str) -> Result<UserInfo, AuthError> {
        let records = self.load_users().await?;
        let user = find_user(&records, user_id).ok_or(AuthError::UserNotFound)?;
        Ok(user_info(user))
    }

    async fn login(&self, user_id: &str, password: &str) -> Result<UserInfo, AuthError> {
        let records = self.load_users().await?;
        let user = find_user(&records, user_id).ok_or(AuthError::UserNotFound)?;

        match &user.kind {
            UserKind::Employee { .. } => Err(AuthError::UnsupportedLoginMethod),
            UserKind::Admin { password_hash } => {
                // An admin without a stored credential can never log in.
                let Some(hash) = password_hash else {
                    return Err(AuthError::InvalidCredentials);
                };

                let is_valid = verify_password_blocking(hash, password)
                    .await
                    .map_err(|e| AuthError::Internal(e.to_string()))?;
                if !is_valid {
                    return Err(AuthError::InvalidCredentials);
                }

                info!("Admin '{}' logged in", user.id);
                Ok(user_info(user))
            }
        }
    }

    async fn generate_otp(&self, user_id: &str) -> Result<IssuedOtp, AuthError> {
        let _guard = self.store.lock_users_for_update().await;

        let mut records = self.load_users().await?;
        let index = find_user_index(&records, user_id).ok_or(AuthError::UserNotFound)?;

        let code = generate_otp_code();
        match &mut records[index].kind {
            UserKind::Employee {
                otp,
                otp_created_at,
            } => {
                *otp = Some(code.clone());
                *otp_created_at = Some(Utc::now());
            }
            UserKind::Admin { .. } => return Err(AuthError::UnsupportedLoginMethod),
        }

        self.store.save_users(&records).await?;
        info!("Issued OTP for employee '{}'", records[index].id);

        Ok(IssuedOtp { otp: code })
    }

    async fn verify_otp(&self, user_id: &str, submitted: &str) -> Result<UserInfo, AuthError> {
        self.verify_otp_at(user_id, submitted, Utc::now()).await
    }

    async fn add_user(
        &self,
        id: &str,
        name: &str,
        password: Option<&str>,
        role: Role,
    ) -> Result<UserSummary, AuthError> {
        let _guard = self.store.lock_users_for_update().await;

        let mut records = self.load_users().await?;
        if find_user(&records, id).is_some() {
            return Err(AuthError::DuplicateId(id.to_string()));
        }

        let kind = match role {
            Role::Admin => {
                let password_hash = match password {
                    Some(password) => Some(
                        hash_password_blocking(password, &self.security)
                            .await
                            .map_err(|e| AuthError::Internal(e.to_string()))?,
                    ),
                    None => None,
                };
                UserKind::Admin { password_hash }
            }
            // Employees authenticate by OTP only; any supplied password is
            // dropped.
            Role::Employee => UserKind::Employee {
                otp: None,
                otp_created_at: None,
            },
        };

        let record = UserRecord {
            id: id.to_string(),
            name: name.to_string(),
            kind,
        };
        let summary = user_summary(&record);
        records.push(record);

        self.store.save_users(&records).await?;
        info!("Added {} account '{}'", role, id);

        Ok(summary)
    }

    async fn delete_user(&self, id: &str) -> Result<(), AuthError> {
        // Checked before touching the store so the built-ins survive even a
        // store that has lost them.
        if user_constants::PROTECTED_USER_IDS.contains(&id) {
            return Err(AuthError::ProtectedAccount(id.to_string()));
        }

        let _guard = self.store.lock_users_for_update().await;

        let mut records = self.load_users().await?;
        let index = records
            .iter()
            .position(|u| u.id == id)
            .ok_or(AuthError::UserNotFound)?;
        records.remove(index);

        self.store.save_users(&records).await?;
        info!("Deleted account '{id}'");

        Ok(())
    }

    async fn update_admin(
        &self,
        admin_id: &str,
        name: Option<&str>,
        new_password: Option<&str>,
    ) -> Result<UserSummary, AuthError> {
        let _guard = self.store.lock_users_for_update().await;

        let mut records = self.load_users().await?;
        let index = find_user_index(&records, admin_id).ok_or(AuthError::UserNotFound)?;
        if records[index].role() != Role::Admin {
            return Err(AuthError::UserNotFound);
        }

        let new_hash = match new_password {
            Some(password) => Some(
                hash_password_blocking(password, &self.security)
                    .await
                    .map_err(|e| AuthError::Internal(e.to_string()))?,
            ),
            None => None,
        };

        if let Some(name) = name {
            records[index].name = name.to_string();
        }
        if let Some(hash) = new_hash
            && let UserKind::Admin { password_hash } = &mut records[index].kind
        {
            *password_hash = Some(hash);
        }

        let summary = user_summary(&records[index]);
        self.store.save_users(&records).await?;
        info!("Updated admin account '{}'", summary.id);

        Ok(summary)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, AuthError> {
        let records = self.load_users().await?;
        Ok(records.iter().map(user_summary).collect())
    }

    async fn revoke_otp(&self, user_id: &str) -> Result<(), AuthError> {
        let _guard = self.store.lock_users_for_update().await;

        let mut records = self.load_users().await?;
        let index = find_user_index(&records, user_id).ok_or(AuthError::UserNotFound)?;

        match &mut records[index].kind {
            UserKind::Employee {
                otp,
                otp_created_at,
            } => {
                *otp = None;
                *otp_created_at = None;
            }
            UserKind::Admin { .. } => return Err(AuthError::UnsupportedLoginMethod),
        }

        self.store.save_users(&records).await?;
        info!("Revoked OTP for employee '{}'", records[index].id);

        Ok(())
    }
}
