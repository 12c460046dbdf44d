//! Task record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{TaskId, UserId};
use super::state::TaskStatus;

/// A stored task record.
///
/// Design:
/// - This is the "single source of truth" for task state; the store owns it.
/// - Queue structures hold `TaskId` only, never a copy of the record.
/// - `id`, `owner_id` and `created_at` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh record from a validated draft.
    /// `created_at == updated_at == now`.
    pub fn new(id: TaskId, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id: draft.owner_id,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the status and refresh `updated_at`.
    ///
    /// `updated_at` never moves before `created_at`, even if the clock does.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now.max(self.created_at);
    }

    /// Open (pending / in_progress) and created strictly before `threshold`.
    pub fn is_eligible(&self, threshold: DateTime<Utc>) -> bool {
        self.status.is_open() && self.created_at < threshold
    }
}

/// Validated input for `TaskStore::create`.
///
/// The store assigns `id` and timestamps; everything else comes from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

/// Create request as supplied by the request-encoding layer.
///
/// `status` is optional; the service defaults it to `pending`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: Option<TaskStatus>,
}

impl NewTask {
    /// Convenience constructor for simple "title only" use cases.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use ulid::Ulid;

    fn draft(status: TaskStatus) -> TaskDraft {
        TaskDraft {
            owner_id: UserId::from_ulid(Ulid::new()),
            title: "Write report".to_string(),
            description: String::new(),
            status,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_task_has_equal_timestamps() {
        let task = Task::new(TaskId::from_ulid(Ulid::new()), draft(TaskStatus::Pending), t0());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn set_status_never_moves_updated_at_before_created_at() {
        let mut task = Task::new(TaskId::from_ulid(Ulid::new()), draft(TaskStatus::Pending), t0());

        task.set_status(TaskStatus::Completed, t0() - Duration::minutes(5));
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.updated_at, task.created_at);

        task.set_status(TaskStatus::InProgress, t0() + Duration::minutes(5));
        assert_eq!(task.updated_at, t0() + Duration::minutes(5));
    }

    #[test]
    fn eligibility_requires_open_status_and_strictly_older() {
        let open = Task::new(TaskId::from_ulid(Ulid::new()), draft(TaskStatus::InProgress), t0());
        assert!(open.is_eligible(t0() + Duration::seconds(1)));
        assert!(!open.is_eligible(t0()));

        let done = Task::new(TaskId::from_ulid(Ulid::new()), draft(TaskStatus::Completed), t0());
        assert!(!done.is_eligible(t0() + Duration::hours(1)));
    }

    #[test]
    fn new_task_without_status_then_status_is_none() {
        let json = r#"{ "title": "hello" }"#;
        let req: NewTask = serde_json::from_str(json).expect("deserialize");
        assert_eq!(req.title, "hello");
        assert_eq!(req.description, "");
        assert_eq!(req.status, None);
    }

    #[test]
    fn task_serializes_owner_as_user_id() {
        let task = Task::new(TaskId::from_ulid(Ulid::new()), draft(TaskStatus::Pending), t0());
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["user_id"], task.owner_id.to_string());
        assert_eq!(value["status"], "pending");
    }
}
