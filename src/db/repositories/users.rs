use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::constants::{otp, users};
use crate::db::backend::{Entity, StorageBackend};
use crate::models::{UserKind, UserRecord};

/// Typed access to the user store. Corrupt user data is an error here, never
/// silently replaced; account state is not something to guess at.
pub struct UserRepository {
    backend: Arc<dyn StorageBackend>,
}

impl UserRepository {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub async fn load_users(&self) -> Result<Option<Vec<UserRecord>>> {
        let Some(bytes) = self.backend.load(Entity::Users).await? else {
            return Ok(None);
        };
        let records = serde_json::from_slice(&bytes).context("malformed users document")?;
        Ok(Some(records))
    }

    pub async fn save_users(&self, records: &[UserRecord]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(records).context("failed to serialize users")?;
        self.backend.save(Entity::Users, bytes).await
    }

    /// Loads all accounts, creating the bootstrap admin and default employee
    /// on first access to an empty store.
    pub async fn load_or_seed(&self, security: &SecurityConfig) -> Result<Vec<UserRecord>> {
        if let Some(records) = self.load_users().await? {
            return Ok(records);
        }

        let records = default_users(security).await?;
        self.save_users(&records).await?;
        info!("Seeded default user accounts");
        Ok(records)
    }
}

/// The accounts present in a freshly initialized store. The admin password
/// starts as the well-known bootstrap value and is stored hashed.
pub async fn default_users(security: &SecurityConfig) -> Result<Vec<UserRecord>> {
    let bootstrap_hash =
        hash_password_blocking(users::BOOTSTRAP_ADMIN_PASSWORD, security).await?;

    Ok(vec![
        UserRecord {
            id: users::BOOTSTRAP_ADMIN_ID.to_string(),
            name: users::BOOTSTRAP_ADMIN_NAME.to_string(),
            kind: UserKind::Admin {
                password_hash: Some(bootstrap_hash),
            },
        },
        UserRecord {
            id: users::DEFAULT_EMPLOYEE_ID.to_string(),
            name: users::DEFAULT_EMPLOYEE_NAME.to_string(),
            kind: UserKind::Employee {
                otp: None,
                otp_created_at: None,
            },
        },
    ])
}

/// Hash a password using Argon2id with the configured cost params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Hash on a blocking thread. Argon2 is CPU-intensive and would stall the
/// async runtime if run inline.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

/// Verify a candidate password against a stored hash on a blocking thread.
pub async fn verify_password_blocking(stored_hash: &str, password: &str) -> Result<bool> {
    let password_hash = stored_hash.to_string();
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        let argon2 = Argon2::default();
        Ok::<bool, anyhow::Error>(
            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Generate a 6-digit login code.
#[must_use]
pub fn generate_otp_code() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    rng.random_range(otp::CODE_MIN..=otp::CODE_MAX).to_string()
}

/// Case-insensitive account lookup; stored casing wins for display.
#[must_use]
pub fn find_user<'a>(records: &'a [UserRecord], user_id: &str) -> Option<&'a UserRecord> {
    records.iter().find(|u| u.id.eq_ignore_ascii_case(user_id))
}

#[must_use]
pub fn find_user_index(records: &[UserRecord], user_id: &str) -> Option<usize> {
    records
        .iter()
        .position(|u| u.id.eq_ignore_ascii_case(user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn test_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 16,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn otp_codes_are_six_digits() {
        for _ in 0..200 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            let numeric: u32 = code.parse().unwrap();
            assert!((otp::CODE_MIN..=otp::CODE_MAX).contains(&numeric));
        }
    }

    #[test]
    fn user_lookup_ignores_case() {
        let records = vec![UserRecord {
            id: "Rakesh".to_string(),
            name: "Rakesh".to_string(),
            kind: UserKind::Employee {
                otp: None,
                otp_created_at: None,
            },
        }];

        assert!(find_user(&records, "rakesh").is_some());
        assert!(find_user(&records, "RAKESH").is_some());
        assert_eq!(find_user_index(&records, "rakESH"), Some(0));
        assert!(find_user(&records, "other").is_none());
    }

    #[tokio::test]
    async fn hash_and_verify_round_trip() {
        let hash = hash_password_blocking("secret", &test_security())
            .await
            .unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password_blocking(&hash, "secret").await.unwrap());
        assert!(!verify_password_blocking(&hash, "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn default_users_are_protected_pair() {
        let records = default_users(&test_security()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "admin");
        assert_eq!(records[0].role(), Role::Admin);
        assert_eq!(records[1].id, "employee");
        assert_eq!(records[1].role(), Role::Employee);

        match &records[0].kind {
            UserKind::Admin { password_hash } => {
                let hash = password_hash.as_ref().unwrap();
                assert!(verify_password_blocking(hash, "admin").await.unwrap());
            }
            UserKind::Employee { .. } => panic!("expected admin"),
        }
    }
}
