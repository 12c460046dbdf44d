//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 方針
//! - Builder パターンで store / user store / hasher / clock / 設定を受け取る
//! - 起動時検証（Fail-fast 設計）: 動かない設定は `build()` で弾く
//! - 明確なエラーメッセージ

use std::sync::Arc;

use super::auto_complete::{AutoCompleteConfig, AutoCompleter};
use super::task_service::TaskService;
use super::user_service::UserService;
use crate::impls::{Argon2Hasher, InMemoryTaskStore, InMemoryUserStore};
use crate::ports::{Clock, PasswordHasher, SystemClock, TaskStore, UserStore};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .store(Arc::new(store))
///     .auto_complete(AutoCompleteConfig::with_window_minutes(10))
///     .build()?;
/// ```
pub struct AppBuilder {
    store: Option<Arc<dyn TaskStore>>,
    users: Option<Arc<dyn UserStore>>,
    hasher: Option<Arc<dyn PasswordHasher>>,
    clock: Option<Arc<dyn Clock>>,
    auto_complete: AutoCompleteConfig,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("auto-completion needs at least one worker")]
    NoWorkers,

    #[error("candidate queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("scan interval must be greater than zero")]
    ZeroTick,

    #[error("auto-completion window must be greater than zero")]
    NonPositiveWindow,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            users: None,
            hasher: None,
            clock: None,
            auto_complete: AutoCompleteConfig::default(),
        }
    }

    /// 未指定なら `SystemClock` 上の `InMemoryTaskStore`
    pub fn store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// 未指定なら `SystemClock` 上の `InMemoryUserStore`
    pub fn users(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    /// 未指定なら `Argon2Hasher`
    pub fn password_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn auto_complete(mut self, config: AutoCompleteConfig) -> Self {
        self.auto_complete = config;
        self
    }

    /// # 検証
    /// - workers / queue_capacity / tick が 0 でないこと
    /// - window が正であること
    pub fn build(self) -> Result<App, BuildError> {
        let config = self.auto_complete;
        if config.workers == 0 {
            return Err(BuildError::NoWorkers);
        }
        if config.queue_capacity == 0 {
            return Err(BuildError::ZeroQueueCapacity);
        }
        if config.tick.is_zero() {
            return Err(BuildError::ZeroTick);
        }
        if config.window <= chrono::TimeDelta::zero() {
            return Err(BuildError::NonPositiveWindow);
        }

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let store = self.store.unwrap_or_else(|| {
            Arc::new(InMemoryTaskStore::new(Arc::clone(&clock))) as Arc<dyn TaskStore>
        });

        let users = self.users.unwrap_or_else(|| {
            Arc::new(InMemoryUserStore::new(Arc::clone(&clock))) as Arc<dyn UserStore>
        });
        let hasher = self
            .hasher
            .unwrap_or_else(|| Arc::new(Argon2Hasher::new()) as Arc<dyn PasswordHasher>);

        Ok(App {
            service: TaskService::new(Arc::clone(&store)),
            users: UserService::new(users, hasher),
            auto_completer: Arc::new(AutoCompleter::new(store, clock, config)),
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App は組み立て済みの部品
///
/// - `service`: リクエスト処理から使う
/// - `users`: 登録・ログイン
/// - `auto_completer`: `spawn()` でバックグラウンド起動する
pub struct App {
    pub service: TaskService,
    pub users: UserService,
    pub auto_completer: Arc<AutoCompleter>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Caller, NewTask, Registration, UserId};
    use chrono::TimeDelta;
    use rstest::rstest;
    use std::time::Duration;
    use ulid::Ulid;

    #[test]
    fn build_with_defaults() {
        let app = AppBuilder::new().build();
        assert!(app.is_ok());
    }

    #[rstest]
    #[case(AutoCompleteConfig { workers: 0, ..AutoCompleteConfig::default() }, BuildError::NoWorkers)]
    #[case(AutoCompleteConfig { queue_capacity: 0, ..AutoCompleteConfig::default() }, BuildError::ZeroQueueCapacity)]
    #[case(AutoCompleteConfig { tick: Duration::ZERO, ..AutoCompleteConfig::default() }, BuildError::ZeroTick)]
    #[case(AutoCompleteConfig { window: TimeDelta::zero(), ..AutoCompleteConfig::default() }, BuildError::NonPositiveWindow)]
    fn build_rejects_unusable_config(#[case] config: AutoCompleteConfig, #[case] expected: BuildError) {
        let err = AppBuilder::new().auto_complete(config).build().err();
        assert_eq!(err, Some(expected));
    }

    #[tokio::test]
    async fn service_and_completer_share_the_store() {
        let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new(Arc::new(SystemClock)));
        let app = AppBuilder::new().store(Arc::clone(&store)).build().unwrap();

        let caller = Caller::user(UserId::from_ulid(Ulid::new()));
        let task = app
            .service
            .create_task(&caller, NewTask::new("shared"))
            .await
            .unwrap();
        assert_eq!(store.find_by_id(task.id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn users_go_to_the_given_store() {
        let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new(Arc::new(SystemClock)));
        let app = AppBuilder::new().users(Arc::clone(&users)).build().unwrap();

        let user = app
            .users
            .register(Registration {
                email: "carol@example.com".to_string(),
                username: "carol".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            users.find_by_email("carol@example.com").await.unwrap(),
            Some(user)
        );
    }
}
