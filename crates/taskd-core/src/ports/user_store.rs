//! UserStore port - アカウントの正本
//!
//! メールアドレス（大文字小文字を区別しない）が一意キーです。

use async_trait::async_trait;

use crate::domain::{TaskdError, User, UserDraft};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account; the store assigns `id` and `created_at`.
    ///
    /// An email that is already registered is `TaskdError::Conflict`.
    async fn create(&self, draft: UserDraft) -> Result<User, TaskdError>;

    /// `None` when no account uses this email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, TaskdError>;
}
