//! Candidate queue: bounded FIFO of task ids between the scanner and workers.
//!
//! Design intent:
//! - The queue carries `TaskId` only; record state stays in the store.
//! - `offer` never blocks. A full queue rejects the id and the scanner moves on.
//! - Closing is done by dropping the sender. Workers still drain what is
//!   buffered, then `recv` returns `None`.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

use crate::domain::TaskId;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,
}

/// Result of a non-blocking offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Queued,
    /// Queue at capacity; the id was dropped.
    Full,
    /// All receivers are gone.
    Closed,
}

/// Create a queue with a fixed capacity.
pub fn candidate_queue(
    capacity: usize,
) -> Result<(CandidateSender, CandidateReceiver), QueueError> {
    if capacity == 0 {
        return Err(QueueError::ZeroCapacity);
    }
    let (tx, rx) = mpsc::channel(capacity);
    Ok((
        CandidateSender { tx },
        CandidateReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    ))
}

/// Producer half, owned by the scanner.
#[derive(Debug)]
pub struct CandidateSender {
    tx: mpsc::Sender<TaskId>,
}

impl CandidateSender {
    pub fn offer(&self, id: TaskId) -> Offer {
        match self.tx.try_send(id) {
            Ok(()) => Offer::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => Offer::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => Offer::Closed,
        }
    }

    /// Number of ids currently buffered.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the queue. Buffered ids remain receivable.
    pub fn close(self) {
        drop(self);
    }
}

/// Consumer half, shared by every worker.
///
/// The receiver sits behind a mutex so that exactly one worker gets each id.
#[derive(Debug, Clone)]
pub struct CandidateReceiver {
    rx: Arc<Mutex<mpsc::Receiver<TaskId>>>,
}

impl CandidateReceiver {
    /// Wait for the next id. `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<TaskId> {
        self.rx.lock().await.recv().await
    }
}
