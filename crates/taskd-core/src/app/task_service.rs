//! TaskService - 呼び出し元つきのタスク操作
//!
//! ストアの上に認可ポリシーを載せる層です。
//! - 一覧: 非特権ユーザーは常に自分のレコードだけ、特権ユーザーは全件
//! - 単体操作: 取得後に所有者（または特権）かを確認し、違反は Forbidden
//!
//! 認可違反を NotFound に丸めることはしません。

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    Caller, ListQuery, NewTask, PageRequest, Task, TaskDraft, TaskId, TaskPage, TaskStatus,
    TaskdError, parse_status_filter,
};
use crate::ports::TaskStore;

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn create_task(&self, caller: &Caller, new: NewTask) -> Result<Task, TaskdError> {
        if new.title.trim().is_empty() {
            return Err(TaskdError::Invalid("title is required".to_string()));
        }

        let task = self
            .store
            .create(TaskDraft {
                owner_id: caller.user_id,
                title: new.title,
                description: new.description,
                status: new.status.unwrap_or_default(),
            })
            .await?;

        info!(task_id = %task.id, user_id = %caller.user_id, "task created");
        Ok(task)
    }

    pub async fn get_task(&self, caller: &Caller, id: TaskId) -> Result<Task, TaskdError> {
        self.fetch_authorized(caller, id).await
    }

    pub async fn list_tasks(
        &self,
        caller: &Caller,
        query: ListQuery,
    ) -> Result<TaskPage, TaskdError> {
        let status = parse_status_filter(query.status.as_deref())?;
        let request = PageRequest::new(query.page, query.limit);

        let (tasks, total) = if caller.is_privileged() {
            self.store.find_all(status, request.window()).await?
        } else {
            self.store
                .find_by_owner(caller.user_id, status, request.window())
                .await?
        };

        Ok(TaskPage::new(tasks, request, total))
    }

    pub async fn update_task_status(
        &self,
        caller: &Caller,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<Task, TaskdError> {
        self.fetch_authorized(caller, id).await?;

        let task = self.store.update_status(id, status).await?;
        info!(task_id = %id, status = %status, "task status updated");
        Ok(task)
    }

    pub async fn delete_task(&self, caller: &Caller, id: TaskId) -> Result<(), TaskdError> {
        self.fetch_authorized(caller, id).await?;

        self.store.delete(id).await?;
        info!(task_id = %id, "task deleted");
        Ok(())
    }

    async fn fetch_authorized(&self, caller: &Caller, id: TaskId) -> Result<Task, TaskdError> {
        let task = self.store.find_by_id(id).await?;
        if !caller.can_act_on(task.owner_id) {
            return Err(TaskdError::Forbidden(
                "you don't have permission to access this task".to_string(),
            ));
        }
        Ok(task)
    }
}
