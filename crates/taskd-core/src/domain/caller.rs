//! Authenticated caller descriptor.
//!
//! 認証済みの呼び出し元は暗黙のコンテキストではなく、すべての呼び出しに
//! 明示的な引数 (`&Caller`) として渡します。

use serde::{Deserialize, Serialize};

use super::ids::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

/// A verified `(user_id, role)` pair supplied by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::User,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    /// Privileged callers can see and act on every record.
    pub fn is_privileged(&self) -> bool {
        self.role == Role::Admin
    }

    /// May this caller act on a record owned by `owner`?
    pub fn can_act_on(&self, owner: UserId) -> bool {
        self.is_privileged() || self.user_id == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn owner_and_admin_can_act_others_cannot() {
        let owner = UserId::from_ulid(Ulid::new());
        let stranger = UserId::from_ulid(Ulid::new());

        assert!(Caller::user(owner).can_act_on(owner));
        assert!(!Caller::user(stranger).can_act_on(owner));
        assert!(Caller::admin(stranger).can_act_on(owner));
    }
}
