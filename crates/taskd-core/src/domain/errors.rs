//! Errors - エラー型と分類
//!
//! `TaskdError` がストア・サービス層の唯一のエラー型です。
//! HTTP 層など呼び出し側は `kind()` で分類してレスポンスに変換します。

use std::time::Duration;

use thiserror::Error;

use super::ids::TaskId;

/// ErrorKind はエラーの運用分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 対象のレコードが操作時点で存在しない
    NotFound,
    /// 認証情報が正しくない（ログイン失敗）
    Unauthenticated,
    /// レコードは存在するが、呼び出し元に操作権限がない
    Forbidden,
    /// 入力が不正（空の title、未知の status、壊れた ID など）
    Invalid,
    /// ストア操作が deadline を超えた（リトライ可能）
    Timeout,
    /// 一意制約違反（重複メールアドレスなど）
    Conflict,
    /// それ以外
    Internal,
}

#[derive(Debug, Error)]
pub enum TaskdError {
    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Invalid(String),

    #[error("store operation `{op}` timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl TaskdError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskdError::NotFound(_) => ErrorKind::NotFound,
            TaskdError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            TaskdError::Forbidden(_) => ErrorKind::Forbidden,
            TaskdError::Invalid(_) => ErrorKind::Invalid,
            TaskdError::Timeout { .. } => ErrorKind::Timeout,
            TaskdError::Conflict(_) => ErrorKind::Conflict,
            TaskdError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn kind_classifies_each_variant() {
        let id = TaskId::from_ulid(Ulid::new());
        assert_eq!(TaskdError::NotFound(id).kind(), ErrorKind::NotFound);
        assert_eq!(
            TaskdError::Unauthenticated("who".into()).kind(),
            ErrorKind::Unauthenticated
        );
        assert_eq!(
            TaskdError::Forbidden("no".into()).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(TaskdError::Invalid("bad".into()).kind(), ErrorKind::Invalid);
        assert_eq!(
            TaskdError::Timeout {
                op: "find_by_id",
                after: Duration::from_secs(5)
            }
            .kind(),
            ErrorKind::Timeout
        );
        assert_eq!(TaskdError::Conflict("dup".into()).kind(), ErrorKind::Conflict);
        assert_eq!(TaskdError::Internal("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn timeout_message_names_the_operation() {
        let err = TaskdError::Timeout {
            op: "find_eligible",
            after: Duration::from_secs(10),
        };
        assert!(err.to_string().contains("find_eligible"));
    }
}
