//! InMemoryTaskStore - プロセス内のタスクストア
//!
//! # 実装詳細
//! - `HashMap<TaskId, Task>` を `tokio::sync::RwLock` で保護
//! - 読み取りは共有ロック（並行に進む）、書き込みは排他ロック
//! - ロック取得を含めて操作ごとに deadline を適用する
//!
//! ロックの中で await しないので、ロック取得後の処理は同期的に完結します。

use std::cmp::Reverse;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::{PageWindow, Task, TaskDraft, TaskId, TaskStatus, TaskdError, UserId};
use crate::ports::{Clock, IdGenerator, TaskStore, UlidGenerator};

pub const MEMORY_SCHEME: &str = "memory://";

/// `memory://<name>` の `<name>` 部分。それ以外の URL は接続失敗扱い。
pub(crate) fn memory_store_name(url: &str) -> Result<&str, TaskdError> {
    url.strip_prefix(MEMORY_SCHEME)
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            TaskdError::Internal(format!(
                "cannot connect to store `{url}`: expected {MEMORY_SCHEME}<name>"
            ))
        })
}

/// Per-call deadlines. Lock acquisition counts against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreDeadlines {
    /// Single-record operations (create, find_by_id, update_status, delete).
    pub single: Duration,
    /// Multi-record scans (find_by_owner, find_all, find_eligible).
    pub scan: Duration,
}

impl Default for StoreDeadlines {
    fn default() -> Self {
        Self {
            single: Duration::from_secs(5),
            scan: Duration::from_secs(10),
        }
    }
}

#[derive(Default)]
struct StoreState {
    records: HashMap<TaskId, Task>,
}

impl StoreState {
    /// Filter, order newest first, then apply the window.
    fn page<'a>(
        &'a self,
        matches: impl Fn(&Task) -> bool,
        window: PageWindow,
    ) -> (Vec<Task>, u64) {
        let mut hits: Vec<&'a Task> = self.records.values().filter(|t| matches(t)).collect();
        let total = hits.len() as u64;

        hits.sort_by_key(|t| Reverse((t.created_at, t.id)));

        let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
        let tasks = hits.into_iter().skip(skip).take(limit).cloned().collect();
        (tasks, total)
    }
}

/// In-process task store.
///
/// Owns all record state; nothing outside this type can touch the map.
pub struct InMemoryTaskStore {
    name: String,
    state: RwLock<StoreState>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    deadlines: StoreDeadlines,
}

impl InMemoryTaskStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let ids: Arc<dyn IdGenerator> = Arc::new(UlidGenerator::new(Arc::clone(&clock)));
        Self {
            name: "default".to_string(),
            state: RwLock::new(StoreState::default()),
            clock,
            ids,
            deadlines: StoreDeadlines::default(),
        }
    }

    /// Open a store from a connection string.
    ///
    /// Only `memory://<name>` is understood. Anything else is a connection
    /// failure, which callers treat as fatal at startup.
    pub fn connect(url: &str, clock: Arc<dyn Clock>) -> Result<Self, TaskdError> {
        let name = memory_store_name(url)?;
        let mut store = Self::new(clock);
        store.name = name.to_string();
        Ok(store)
    }

    pub fn with_deadlines(mut self, deadlines: StoreDeadlines) -> Self {
        self.deadlines = deadlines;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn read<R>(
        &self,
        op: &'static str,
        after: Duration,
        f: impl FnOnce(&StoreState) -> Result<R, TaskdError>,
    ) -> Result<R, TaskdError> {
        let guard = timeout(after, self.state.read())
            .await
            .map_err(|_| TaskdError::Timeout { op, after })?;
        f(&guard)
    }

    async fn write<R>(
        &self,
        op: &'static str,
        after: Duration,
        f: impl FnOnce(&mut StoreState) -> Result<R, TaskdError>,
    ) -> Result<R, TaskdError> {
        let mut guard = timeout(after, self.state.write())
            .await
            .map_err(|_| TaskdError::Timeout { op, after })?;
        f(&mut guard)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, draft: TaskDraft) -> Result<Task, TaskdError> {
        let now = self.clock.now();
        let id = self.ids.generate_task_id();
        let task = Task::new(id, draft, now);

        self.write("create", self.deadlines.single, |state| {
            match state.records.entry(id) {
                Entry::Occupied(_) => Err(TaskdError::Conflict(format!("duplicate task id {id}"))),
                Entry::Vacant(slot) => Ok(slot.insert(task).clone()),
            }
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Task, TaskdError> {
        self.read("find_by_id", self.deadlines.single, |state| {
            state
                .records
                .get(&id)
                .cloned()
                .ok_or(TaskdError::NotFound(id))
        })
        .await
    }

    async fn find_by_owner(
        &self,
        owner: UserId,
        status: Option<TaskStatus>,
        window: PageWindow,
    ) -> Result<(Vec<Task>, u64), TaskdError> {
        self.read("find_by_owner", self.deadlines.scan, |state| {
            Ok(state.page(
                |t| t.owner_id == owner && status.is_none_or(|s| t.status == s),
                window,
            ))
        })
        .await
    }

    async fn find_all(
        &self,
        status: Option<TaskStatus>,
        window: PageWindow,
    ) -> Result<(Vec<Task>, u64), TaskdError> {
        self.read("find_all", self.deadlines.scan, |state| {
            Ok(state.page(|t| status.is_none_or(|s| t.status == s), window))
        })
        .await
    }

    async fn update_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, TaskdError> {
        let now = self.clock.now();
        self.write("update_status", self.deadlines.single, |state| {
            let record = state
                .records
                .get_mut(&id)
                .ok_or(TaskdError::NotFound(id))?;
            record.set_status(status, now);
            debug!(task_id = %id, %status, "task status updated");
            Ok(record.clone())
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> Result<(), TaskdError> {
        self.write("delete", self.deadlines.single, |state| {
            state
                .records
                .remove(&id)
                .map(|_| ())
                .ok_or(TaskdError::NotFound(id))
        })
        .await
    }

    async fn find_eligible(&self, older_than: DateTime<Utc>) -> Result<Vec<Task>, TaskdError> {
        self.read("find_eligible", self.deadlines.scan, |state| {
            let mut eligible: Vec<Task> = state
                .records
                .values()
                .filter(|t| t.is_eligible(older_than))
                .cloned()
                .collect();
            eligible.sort_by_key(|t| (t.created_at, t.id));
            Ok(eligible)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PageRequest;
    use crate::ports::ManualClock;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use ulid::Ulid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn setup() -> (InMemoryTaskStore, ManualClock) {
        let clock = ManualClock::new(t0());
        let store = InMemoryTaskStore::new(Arc::new(clock.clone()));
        (store, clock)
    }

    fn draft(owner: UserId, title: &str, status: TaskStatus) -> TaskDraft {
        TaskDraft {
            owner_id: owner,
            title: title.to_string(),
            description: String::new(),
            status,
        }
    }

    fn user() -> UserId {
        UserId::from_ulid(Ulid::new())
    }

    #[tokio::test]
    async fn create_then_find_by_id_roundtrip() {
        let (store, _clock) = setup();
        let owner = user();

        let created = store
            .create(draft(owner, "Write report", TaskStatus::Pending))
            .await
            .unwrap();
        let found = store.find_by_id(created.id).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(found.created_at, t0());
        assert_eq!(found.updated_at, found.created_at);
        assert_eq!(found.owner_id, owner);
    }

    #[tokio::test]
    async fn find_by_id_missing_is_not_found() {
        let (store, _clock) = setup();
        let id = TaskId::from_ulid(Ulid::new());

        let err = store.find_by_id(id).await.unwrap_err();
        assert!(matches!(err, TaskdError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn find_by_owner_is_scoped_newest_first_and_paginated() {
        let (store, clock) = setup();
        let alice = user();
        let bob = user();

        for i in 0..15 {
            store
                .create(draft(alice, &format!("a{i}"), TaskStatus::Pending))
                .await
                .unwrap();
            store
                .create(draft(bob, &format!("b{i}"), TaskStatus::Pending))
                .await
                .unwrap();
            clock.advance(ChronoDuration::seconds(1));
        }

        let page2 = PageRequest::new(Some(2), Some(10));
        let (tasks, total) = store
            .find_by_owner(alice, None, page2.window())
            .await
            .unwrap();

        assert_eq!(total, 15);
        assert_eq!(tasks.len(), 5);
        assert!(tasks.iter().all(|t| t.owner_id == alice));
        // newest first: page 2 holds the five oldest, a4..a0
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a4", "a3", "a2", "a1", "a0"]);
    }

    #[tokio::test]
    async fn status_filter_applies_to_rows_and_count() {
        let (store, clock) = setup();
        let owner = user();

        for status in [
            TaskStatus::Pending,
            TaskStatus::Completed,
            TaskStatus::Completed,
            TaskStatus::InProgress,
        ] {
            store.create(draft(owner, "t", status)).await.unwrap();
            clock.advance(ChronoDuration::seconds(1));
        }
        store
            .create(draft(user(), "other", TaskStatus::Completed))
            .await
            .unwrap();

        let window = PageRequest::default().window();
        let (mine, mine_total) = store
            .find_by_owner(owner, Some(TaskStatus::Completed), window)
            .await
            .unwrap();
        assert_eq!(mine_total, 2);
        assert!(mine.iter().all(|t| t.status == TaskStatus::Completed));

        let (all, all_total) = store
            .find_all(Some(TaskStatus::Completed), window)
            .await
            .unwrap();
        assert_eq!(all_total, 3);
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn window_past_the_end_returns_empty_page_with_total() {
        let (store, _clock) = setup();
        let owner = user();
        store
            .create(draft(owner, "only", TaskStatus::Pending))
            .await
            .unwrap();

        let (tasks, total) = store
            .find_all(None, PageRequest::new(Some(5), Some(10)).window())
            .await
            .unwrap();
        assert!(tasks.is_empty());
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn update_status_refreshes_updated_at() {
        let (store, clock) = setup();
        let task = store
            .create(draft(user(), "t", TaskStatus::Pending))
            .await
            .unwrap();

        clock.advance(ChronoDuration::minutes(3));
        let updated = store
            .update_status(task.id, TaskStatus::InProgress)
            .await
            .unwrap();

        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.updated_at, t0() + ChronoDuration::minutes(3));
        assert_eq!(updated.created_at, task.created_at);
        assert_eq!(store.find_by_id(task.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_after_delete_is_not_found() {
        let (store, _clock) = setup();
        let task = store
            .create(draft(user(), "t", TaskStatus::Pending))
            .await
            .unwrap();

        store.delete(task.id).await.unwrap();

        let err = store
            .update_status(task.id, TaskStatus::Completed)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.delete(task.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn find_eligible_is_open_strictly_older_oldest_first() {
        let (store, clock) = setup();
        let owner = user();

        let oldest = store
            .create(draft(owner, "oldest", TaskStatus::InProgress))
            .await
            .unwrap();
        clock.advance(ChronoDuration::minutes(1));
        let done = store
            .create(draft(owner, "done", TaskStatus::Completed))
            .await
            .unwrap();
        clock.advance(ChronoDuration::minutes(1));
        let middle = store
            .create(draft(owner, "middle", TaskStatus::Pending))
            .await
            .unwrap();
        clock.advance(ChronoDuration::minutes(1));
        let at_threshold = store
            .create(draft(owner, "at threshold", TaskStatus::Pending))
            .await
            .unwrap();

        let eligible = store
            .find_eligible(at_threshold.created_at)
            .await
            .unwrap();
        let ids: Vec<TaskId> = eligible.iter().map(|t| t.id).collect();

        assert_eq!(ids, vec![oldest.id, middle.id]);
        assert!(!ids.contains(&done.id));
    }

    #[tokio::test]
    async fn read_times_out_while_writer_holds_the_lock() {
        let (store, _clock) = setup();
        let store = store.with_deadlines(StoreDeadlines {
            single: Duration::from_millis(20),
            scan: Duration::from_millis(20),
        });

        let guard = store.state.write().await;
        let err = store
            .find_by_id(TaskId::from_ulid(Ulid::new()))
            .await
            .unwrap_err();
        drop(guard);

        assert!(matches!(
            err,
            TaskdError::Timeout {
                op: "find_by_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn writer_times_out_while_reader_holds_the_lock() {
        let (store, _clock) = setup();
        let store = store.with_deadlines(StoreDeadlines {
            single: Duration::from_millis(20),
            scan: Duration::from_millis(20),
        });

        let guard = store.state.read().await;
        // 他の読み取りは共有ロックなので進める
        let (_, total) = store
            .find_all(None, PageRequest::default().window())
            .await
            .unwrap();
        assert_eq!(total, 0);

        let err = store
            .create(draft(user(), "t", TaskStatus::Pending))
            .await
            .unwrap_err();
        drop(guard);

        assert!(matches!(err, TaskdError::Timeout { op: "create", .. }));
    }

    #[test]
    fn connect_accepts_memory_urls_only() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(t0()));

        let store = InMemoryTaskStore::connect("memory://taskdb", Arc::clone(&clock)).unwrap();
        assert_eq!(store.name(), "taskdb");

        assert!(InMemoryTaskStore::connect("memory://", Arc::clone(&clock)).is_err());
        assert!(
            InMemoryTaskStore::connect("mongodb://localhost:27017", Arc::clone(&clock)).is_err()
        );
    }
}
