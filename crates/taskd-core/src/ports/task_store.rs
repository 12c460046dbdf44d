//! TaskStore port - タスクレコードの正本（source of truth）
//!
//! スキャナ・ワーカー・ユーザー向けの読み書きはすべてこの trait を経由します。
//! 実装はロック規律と deadline を自分で持ち、可変状態を外に出しません。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{PageWindow, Task, TaskDraft, TaskId, TaskStatus, TaskdError, UserId};

/// TaskStore はタスクレコードの唯一のデータアクセス面
///
/// # 設計原則
/// - 読み取り (`find_*`) は共有ロック、書き込みは排他ロック
/// - すべての操作に deadline があり、超えたら `TaskdError::Timeout`
/// - 認可はここでは行わない（サービス層の責務）
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new record; the store assigns `id`, `created_at` and `updated_at`.
    async fn create(&self, draft: TaskDraft) -> Result<Task, TaskdError>;

    async fn find_by_id(&self, id: TaskId) -> Result<Task, TaskdError>;

    /// Records of one owner, newest first, plus the filtered total count.
    async fn find_by_owner(
        &self,
        owner: UserId,
        status: Option<TaskStatus>,
        window: PageWindow,
    ) -> Result<(Vec<Task>, u64), TaskdError>;

    /// Same as `find_by_owner` but across all owners.
    async fn find_all(
        &self,
        status: Option<TaskStatus>,
        window: PageWindow,
    ) -> Result<(Vec<Task>, u64), TaskdError>;

    /// Atomically set `status` and refresh `updated_at`.
    /// `NotFound` if the record is gone at the time of the update.
    async fn update_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, TaskdError>;

    async fn delete(&self, id: TaskId) -> Result<(), TaskdError>;

    /// Open records created strictly before `older_than`, oldest first.
    async fn find_eligible(&self, older_than: DateTime<Utc>) -> Result<Vec<Task>, TaskdError>;
}
