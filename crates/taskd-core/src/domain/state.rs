//! Task status (closed set).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::TaskdError;

/// Task status.
///
/// Transitions are forward in practice (`pending`/`in_progress` -> `completed`),
/// but the store accepts any valid value; only the auto-completer is
/// restricted to writing `Completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Is this a terminal state (no further auto-transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// Can the auto-completer pick this record up?
    pub fn is_open(self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                TaskdError::Invalid(
                    "invalid status, must be one of: pending, in_progress, completed".to_string(),
                )
            })
    }
}
