//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」です。
//! ストア・時刻・ID 生成・パスワードハッシュを trait として切り出し、
//! テストで差し替えられるようにします。

pub mod clock;
pub mod id_generator;
pub mod password;
pub mod task_store;
pub mod user_store;

pub use self::clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::password::PasswordHasher;
pub use self::task_store::TaskStore;
pub use self::user_store::UserStore;
