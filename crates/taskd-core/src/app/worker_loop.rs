//! WorkerLoop - 自動完了ワーカー
//!
//! # フロー
//! 1. `CandidateReceiver::recv()` で task_id 取得
//! 2. `TaskStore::find_by_id()` で最新の状態を再取得
//! 3. open かつ `created_at < now - window` を再確認
//! 4. `TaskStore::update_status(Completed)` で完了に遷移
//!
//! キューに入った時点の情報は信用しません。スキャン後に削除・完了された
//! レコードはここで弾かれます。

use std::sync::Arc;

use chrono::TimeDelta;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::scanner::eligibility_threshold;
use super::status::AutoCompleteOutcome;
use crate::domain::{TaskId, TaskStatus};
use crate::ports::{Clock, TaskStore};
use crate::queue::CandidateReceiver;

/// Processes one candidate at a time. Shared by every worker in a group.
pub struct AutoCompleteWorker {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    window: TimeDelta,
}

impl AutoCompleteWorker {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>, window: TimeDelta) -> Self {
        Self {
            store,
            clock,
            window,
        }
    }

    /// Re-validate and complete a single candidate.
    ///
    /// Never returns an error: every store failure is logged and turned into
    /// an outcome so that one bad id cannot stop the worker.
    pub async fn process(&self, id: TaskId) -> AutoCompleteOutcome {
        let task = match self.store.find_by_id(id).await {
            Ok(task) => task,
            Err(e) if e.is_not_found() => {
                debug!(task_id = %id, "candidate vanished before auto-completion");
                return AutoCompleteOutcome::Missing;
            }
            Err(e) => {
                warn!(task_id = %id, error = %e, "failed to load candidate");
                return AutoCompleteOutcome::Failed;
            }
        };

        if !task.status.is_open() {
            return AutoCompleteOutcome::AlreadyTerminal;
        }

        let threshold = eligibility_threshold(self.clock.now(), self.window);
        if !task.is_eligible(threshold) {
            return AutoCompleteOutcome::NotYetDue;
        }

        match self.store.update_status(id, TaskStatus::Completed).await {
            Ok(_) => {
                info!(task_id = %id, "auto-completed task");
                AutoCompleteOutcome::Completed
            }
            Err(e) if e.is_not_found() => {
                debug!(task_id = %id, "candidate deleted during auto-completion");
                AutoCompleteOutcome::Missing
            }
            Err(e) => {
                warn!(task_id = %id, error = %e, "failed to auto-complete task");
                AutoCompleteOutcome::Failed
            }
        }
    }
}

/// Worker group handle.
/// - ワーカーはキューが閉じられ、空になった時点で終了する
/// - `shutdown` を受けても待ち受けは続ける。送信側（スキャナ）が最後の tick を
///   終えてキューを閉じるまでに入った id も処理される
/// - `join()` で全ワーカーの終了を待てる
pub struct WorkerGroup {
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `n` workers over the same queue.
    pub fn spawn(
        n: usize,
        queue: CandidateReceiver,
        worker: Arc<AutoCompleteWorker>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let queue = queue.clone();
            let worker = Arc::clone(&worker);
            let mut rx = shutdown.clone();

            let join = tokio::spawn(async move {
                worker_loop(worker_id, queue, worker, &mut rx).await;
            });
            joins.push(join);
        }

        Self { joins }
    }

    /// Wait for every worker to exit.
    pub async fn join(self) {
        for j in self.joins {
            if let Err(e) = j.await {
                warn!(error = %e, "auto-completion worker panicked");
            }
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: CandidateReceiver,
    worker: Arc<AutoCompleteWorker>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    debug!(worker_id, "auto-completion worker started");
    let mut completed = 0usize;

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let next = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                // 次のループで判定
                continue;
            }
            next = queue.recv() => next,
        };

        let Some(id) = next else {
            // closed and empty
            debug!(worker_id, completed, "candidate queue closed, worker exiting");
            return;
        };

        if worker.process(id).await.mutated() {
            completed += 1;
        }
    }

    // 停止要求後: シグナルは見ずに、キューが閉じられるまで処理を続ける
    debug!(worker_id, "shutdown requested, draining until the queue closes");
    while let Some(id) = queue.recv().await {
        if worker.process(id).await.mutated() {
            completed += 1;
        }
    }
    debug!(worker_id, completed, "auto-completion worker stopped");
}
