//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryTaskStore**: `memory://<name>` で開くプロセス内ストア
//! - **InMemoryUserStore**: 同じ URL で開くアカウントストア
//! - **Argon2Hasher**: argon2id によるパスワードハッシュ

pub mod argon2_hasher;
pub mod inmem_task_store;
pub mod inmem_user_store;

pub use self::argon2_hasher::Argon2Hasher;
pub use self::inmem_task_store::{InMemoryTaskStore, StoreDeadlines};
pub use self::inmem_user_store::InMemoryUserStore;
