//! AutoCompleter - スキャナ・キュー・ワーカー群の組み立て
//!
//! `run(shutdown)` が唯一の入口です。キャンセルされるまで戻らず、
//! 戻るときには全ワーカーの drain が終わっています。

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::scanner::Scanner;
use super::worker_loop::{AutoCompleteWorker, WorkerGroup};
use crate::ports::{Clock, TaskStore};
use crate::queue::{DEFAULT_CAPACITY, QueueError, candidate_queue};

pub const DEFAULT_WINDOW_MINUTES: u32 = 10;
pub const DEFAULT_TICK: Duration = Duration::from_secs(60);
pub const DEFAULT_WORKERS: usize = 3;

/// Tunables for the auto-completion subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoCompleteConfig {
    /// Records older than `now - window` are eligible.
    pub window: TimeDelta,
    pub tick: Duration,
    pub workers: usize,
    pub queue_capacity: usize,
}

impl AutoCompleteConfig {
    /// Defaults with the window given in minutes.
    pub fn with_window_minutes(minutes: u32) -> Self {
        Self {
            window: TimeDelta::minutes(i64::from(minutes)),
            ..Self::default()
        }
    }
}

impl Default for AutoCompleteConfig {
    fn default() -> Self {
        Self {
            window: TimeDelta::minutes(i64::from(DEFAULT_WINDOW_MINUTES)),
            tick: DEFAULT_TICK,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_CAPACITY,
        }
    }
}

pub struct AutoCompleter {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    config: AutoCompleteConfig,
}

impl AutoCompleter {
    pub fn new(
        store: Arc<dyn TaskStore>,
        clock: Arc<dyn Clock>,
        config: AutoCompleteConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Returns once the scanner has closed the queue and every worker has
    /// exited.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<(), QueueError> {
        let (tx, rx) = candidate_queue(self.config.queue_capacity)?;

        let worker = Arc::new(AutoCompleteWorker::new(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.config.window,
        ));
        let group = WorkerGroup::spawn(self.config.workers, rx, worker, shutdown.clone());

        info!(
            workers = self.config.workers,
            window_minutes = self.config.window.num_minutes(),
            tick_secs = self.config.tick.as_secs(),
            "auto-completion started"
        );

        let scanner = Scanner::new(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.config.window,
        );
        scanner.run(tx, self.config.tick, shutdown).await;

        group.join().await;
        info!("auto-completion stopped");
        Ok(())
    }

    /// Run on a background task with its own shutdown signal.
    pub fn spawn(self: Arc<Self>) -> AutoCompleterHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move { self.run(shutdown_rx).await });
        AutoCompleterHandle { shutdown_tx, join }
    }
}

/// Handle to a spawned [`AutoCompleter`].
pub struct AutoCompleterHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<Result<(), QueueError>>,
}

impl AutoCompleterHandle {
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Signal shutdown and wait for the drain.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        match self.join.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "auto-completion failed to start"),
            Err(e) => warn!(error = %e, "auto-completion task panicked"),
        }
    }
}
