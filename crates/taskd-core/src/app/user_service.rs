//! UserService - 登録とログイン
//!
//! - 登録: 入力検証 → ハッシュ化 → ストアへ（重複メールは Conflict）
//! - ログイン: メールで検索 → ハッシュ照合。失敗理由は区別せず
//!   "invalid credentials" を返す
//!
//! ハッシュ計算は重いので `spawn_blocking` に逃がす。

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{Credentials, Registration, Role, TaskdError, User, UserDraft};
use crate::ports::{PasswordHasher, UserStore};

pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// New accounts always get `Role::User`.
    pub async fn register(&self, req: Registration) -> Result<User, TaskdError> {
        let email = req.email.trim().to_string();
        let username = req.username.trim().to_string();
        if email.is_empty() || username.is_empty() || req.password.is_empty() {
            return Err(TaskdError::Invalid(
                "email, username, and password are required".to_string(),
            ));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(TaskdError::Invalid(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let hasher = Arc::clone(&self.hasher);
        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| TaskdError::Internal(format!("password hashing task failed: {e}")))??;

        let user = self
            .store
            .create(UserDraft {
                email,
                username,
                password_hash,
                role: Role::User,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, creds: Credentials) -> Result<User, TaskdError> {
        if creds.email.trim().is_empty() || creds.password.is_empty() {
            return Err(TaskdError::Invalid(
                "email and password are required".to_string(),
            ));
        }

        let Some(user) = self.store.find_by_email(&creds.email).await? else {
            debug!("login for unknown email");
            return Err(TaskdError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        };

        let hasher = Arc::clone(&self.hasher);
        let hash = user.password_hash.clone();
        let password = creds.password;
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| TaskdError::Internal(format!("password check task failed: {e}")))?;

        if !matches {
            debug!(user_id = %user.id, "login with wrong password");
            return Err(TaskdError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        info!(user_id = %user.id, "user logged in");
        Ok(user)
    }
}
