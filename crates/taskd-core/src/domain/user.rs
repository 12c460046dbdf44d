//! User account record.
//!
//! パスワードはハッシュのみ保持し、JSON には決して出さない。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::caller::{Caller, Role};
use super::ids::UserId;

/// A registered account. The store owns it; `email` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, draft: UserDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: draft.email,
            username: draft.username,
            password_hash: draft.password_hash,
            role: draft.role,
            created_at: now,
        }
    }

    /// The identity a token for this account carries.
    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.id,
            role: self.role,
        }
    }
}

/// Validated, already-hashed input for `UserStore::create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Sign-up request body. Missing fields deserialize as empty and are
/// rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Uniqueness key for an email address.
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}
