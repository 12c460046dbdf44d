//! PasswordHasher port - パスワードハッシュの抽象化
//!
//! # 実装
//! - **Argon2Hasher**: argon2id（本番用）
//!
//! どちらの操作も CPU を使い切るので、呼び出し側は `spawn_blocking` で包む。

use crate::domain::TaskdError;

pub trait PasswordHasher: Send + Sync {
    /// Salted, self-describing hash string.
    fn hash(&self, password: &str) -> Result<String, TaskdError>;

    /// `false` for a wrong password and for an unreadable hash alike.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
