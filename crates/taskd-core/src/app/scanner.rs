//! Scanner - 自動完了候補の発見
//!
//! # フロー
//! 1. 一定間隔で `threshold = now - window` を計算
//! 2. `TaskStore::find_eligible(threshold)` で候補を取得（古い順）
//! 3. 各 id を `CandidateSender::offer` でキューへ（満杯なら捨てる）
//!
//! 捨てた id は open のまま残るので、次の tick で再発見されます。
//! スキャナはキューの空きを待ちません。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::status::ScanReport;
use crate::domain::TaskdError;
use crate::ports::{Clock, TaskStore};
use crate::queue::{CandidateSender, Offer};

/// `now - window`, saturating at the earliest representable instant.
pub(crate) fn eligibility_threshold(now: DateTime<Utc>, window: TimeDelta) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub struct Scanner {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    window: TimeDelta,
}

impl Scanner {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>, window: TimeDelta) -> Self {
        Self {
            store,
            clock,
            window,
        }
    }

    /// One `Idle -> Scanning -> Idle` pass.
    pub async fn scan_once(&self, queue: &CandidateSender) -> Result<ScanReport, TaskdError> {
        let threshold = eligibility_threshold(self.clock.now(), self.window);
        let candidates = self.store.find_eligible(threshold).await?;

        let mut report = ScanReport {
            found: candidates.len(),
            ..ScanReport::default()
        };

        for task in candidates {
            match queue.offer(task.id) {
                Offer::Queued => {
                    debug!(task_id = %task.id, "queued task for auto-completion");
                    report.queued += 1;
                }
                Offer::Full => {
                    debug!(task_id = %task.id, "candidate queue full, skipping task");
                    report.dropped += 1;
                }
                Offer::Closed => {
                    warn!(task_id = %task.id, "candidate queue closed, skipping task");
                    report.dropped += 1;
                }
            }
        }

        Ok(report)
    }

    /// Tick every `tick` until `shutdown` flips to `true` (or its sender is
    /// dropped), then close the queue.
    ///
    /// The first scan happens one full interval after start.
    pub async fn run(
        &self,
        queue: CandidateSender,
        tick: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match self.scan_once(&queue).await {
                        Ok(report) if report.found > 0 => {
                            info!(
                                found = report.found,
                                queued = report.queued,
                                dropped = report.dropped,
                                "auto-completion scan finished"
                            );
                        }
                        Ok(_) => debug!("auto-completion scan found nothing"),
                        Err(e) => warn!(error = %e, "error finding eligible tasks"),
                    }
                }
            }
        }

        if queue.is_empty() {
            debug!("scanner stopped, candidate queue closed");
        } else {
            info!(
                backlog = queue.len(),
                "scanner stopped, workers draining remaining candidates"
            );
        }
        queue.close();
    }
}
