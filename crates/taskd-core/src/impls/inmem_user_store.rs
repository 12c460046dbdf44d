//! InMemoryUserStore - プロセス内のアカウントストア
//!
//! # 実装詳細
//! - `HashMap<UserId, User>` とメール索引を 1 つの `RwLock` で保護
//! - 重複チェックと挿入は同じ書き込みロックの中で行う（check-then-insert の競合なし）
//! - タスクストアと同じく、ロック取得を含めて deadline を適用する

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::timeout;

use super::inmem_task_store::{StoreDeadlines, memory_store_name};
use crate::domain::{TaskdError, User, UserDraft, UserId, email_key};
use crate::ports::{Clock, IdGenerator, UlidGenerator, UserStore};

pub const DUPLICATE_EMAIL: &str = "user with this email already exists";

#[derive(Default)]
struct UserState {
    users: HashMap<UserId, User>,
    /// `email_key(email)` -> id
    by_email: HashMap<String, UserId>,
}

pub struct InMemoryUserStore {
    name: String,
    state: RwLock<UserState>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    deadline: Duration,
}

impl InMemoryUserStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let ids: Arc<dyn IdGenerator> = Arc::new(UlidGenerator::new(Arc::clone(&clock)));
        Self {
            name: "default".to_string(),
            state: RwLock::new(UserState::default()),
            clock,
            ids,
            deadline: StoreDeadlines::default().single,
        }
    }

    /// Same URL scheme as the task store: `memory://<name>`.
    pub fn connect(url: &str, clock: Arc<dyn Clock>) -> Result<Self, TaskdError> {
        let name = memory_store_name(url)?;
        let mut store = Self::new(clock);
        store.name = name.to_string();
        Ok(store)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, draft: UserDraft) -> Result<User, TaskdError> {
        let key = email_key(&draft.email);
        let user = User::new(self.ids.generate_user_id(), draft, self.clock.now());

        let mut guard = timeout(self.deadline, self.state.write())
            .await
            .map_err(|_| TaskdError::Timeout {
                op: "create_user",
                after: self.deadline,
            })?;

        let UserState { users, by_email } = &mut *guard;
        match by_email.entry(key) {
            Entry::Occupied(_) => Err(TaskdError::Conflict(DUPLICATE_EMAIL.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, TaskdError> {
        let state = timeout(self.deadline, self.state.read())
            .await
            .map_err(|_| TaskdError::Timeout {
                op: "find_user_by_email",
                after: self.deadline,
            })?;

        Ok(state
            .by_email
            .get(&email_key(email))
            .and_then(|id| state.users.get(id))
            .cloned())
    }
}
