use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role-specific account state. Admins carry a password hash, employees carry
/// transient OTP state. The two never mix; the serialized form tags each
/// record with its role so a file can't hold an employee with a password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum UserKind {
    Admin {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password_hash: Option<String>,
    },
    Employee {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        otp: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        otp_created_at: Option<DateTime<Utc>>,
    },
}

impl UserKind {
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Admin { .. } => Role::Admin,
            Self::Employee { .. } => Role::Employee,
        }
    }

    /// The currently issued OTP, if this is an employee holding a complete
    /// code/timestamp pair. A half-present pair counts as no OTP.
    #[must_use]
    pub fn active_otp(&self) -> Option<(&str, DateTime<Utc>)> {
        match self {
            Self::Employee {
                otp: Some(code),
                otp_created_at: Some(created_at),
            } => Some((code.as_str(), *created_at)),
            _ => None,
        }
    }
}

/// A stored user account. User ids are compared case-insensitively everywhere
/// they are looked up; the stored casing is preserved for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: UserKind,
}

impl UserRecord {
    #[must_use]
    pub const fn role(&self) -> Role {
        self.kind.role()
    }
}
